use ndarray::s;

use super::context::TransformContext;
use super::transformer::TraitTransformer;
use crate::errors::NetError;
use crate::functions::{Pooling, TraitPooling};
use crate::tensor::Tensor;

/// 池化转换器
///
/// 把输入按不重叠的窗口切块，每块交给池化函数降为一个标量，
/// 输出空间尺寸为`输入尺寸 / 窗口尺寸`（须整除）。
/// 反向传播时把后级误差经池化函数的梯度掩码摊回窗口内各格。
pub struct PoolingTransformer {
    width: usize,
    height: usize,
    function: Pooling,
    output: Option<Tensor>,
    last_input: Option<Tensor>,
    error: Option<Tensor>,
}

impl PoolingTransformer {
    pub fn new(width: usize, height: usize, function: Pooling) -> Result<Self, NetError> {
        if width == 0 || height == 0 {
            return Err(NetError::Configuration("池化窗口尺寸须大于0".to_string()));
        }
        Ok(Self {
            width,
            height,
            function,
            output: None,
            last_input: None,
            error: None,
        })
    }
}

impl TraitTransformer for PoolingTransformer {
    fn transform(&mut self, input: &Tensor, _context: &TransformContext) -> Result<(), NetError> {
        if input.width() % self.width != 0 || input.height() % self.height != 0 {
            return Err(NetError::ShapeMismatch {
                expected: vec![self.width, self.height],
                got: vec![input.width(), input.height()],
                message: "输入尺寸须被池化窗口整除".to_string(),
            });
        }

        let out_width = input.width() / self.width;
        let out_height = input.height() / self.height;
        let mut output = Tensor::new(out_width, out_height, input.num(), input.dimension());

        for n in 0..input.num() {
            for d in 0..input.dimension() {
                let plane = input.plane(n, d);
                for oh in 0..out_height {
                    for ow in 0..out_width {
                        let window = plane.slice(s![
                            oh * self.height..(oh + 1) * self.height,
                            ow * self.width..(ow + 1) * self.width
                        ]);
                        output[(n, d, ow, oh)] = self.function.compute(window);
                    }
                }
            }
        }

        self.last_input = Some(input.clone());
        self.output = Some(output);
        Ok(())
    }

    fn back_propagate(
        &mut self,
        rear_error: Option<&Tensor>,
        _context: &TransformContext,
    ) -> Result<(), NetError> {
        let rear = rear_error
            .ok_or_else(|| NetError::Computation("池化反向传播缺少后级误差".to_string()))?;
        let input = self
            .last_input
            .as_ref()
            .ok_or_else(|| NetError::Computation("反向传播前须先执行前向变换".to_string()))?;
        let out_width = input.width() / self.width;
        let out_height = input.height() / self.height;
        if rear.num() != input.num()
            || rear.dimension() != input.dimension()
            || rear.width() != out_width
            || rear.height() != out_height
        {
            return Err(NetError::ShapeMismatch {
                expected: vec![input.num(), input.dimension(), out_width, out_height],
                got: vec![rear.num(), rear.dimension(), rear.width(), rear.height()],
                message: "后级误差形状与池化输出不符".to_string(),
            });
        }

        let mut input_error =
            Tensor::new(input.width(), input.height(), input.num(), input.dimension());
        for n in 0..input.num() {
            for d in 0..input.dimension() {
                let plane = input.plane(n, d);
                for oh in 0..out_height {
                    for ow in 0..out_width {
                        let window = plane.slice(s![
                            oh * self.height..(oh + 1) * self.height,
                            ow * self.width..(ow + 1) * self.width
                        ]);
                        // 梯度掩码 × 本位置的后级误差，摊回窗口覆盖的每一格
                        let mask = self.function.differentiate(window);
                        let scale = rear[(n, d, ow, oh)];
                        for wh in 0..self.height {
                            for ww in 0..self.width {
                                input_error[(
                                    n,
                                    d,
                                    ow * self.width + ww,
                                    oh * self.height + wh,
                                )] += mask[[wh, ww]] * scale;
                            }
                        }
                    }
                }
            }
        }

        self.error = Some(input_error);
        Ok(())
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }

    fn error(&self) -> Option<&Tensor> {
        self.error.as_ref()
    }
}
