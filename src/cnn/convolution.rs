use super::context::TransformContext;
use super::transformer::TraitTransformer;
use crate::errors::NetError;
use crate::functions::{Activation, TraitActivation};
use crate::tensor::Tensor;

/// 卷积转换器
///
/// 卷积核为4维张量（核数num × 通道dimension × 高 × 宽），通道数须与输入一致。
/// 前向对每个输出位置把感受野内的输入（跨所有样本与通道）
/// 与核权重乘加后过激活函数，输出空间尺寸为`(输入尺寸 − 核尺寸 + 1) / 步幅`（无填充）；
/// 同时缓存每个位置的激活导数与本次输入，供反向传播用。
pub struct ConvolutionalTransformer {
    kernel: Tensor,
    activation: Activation,
    stride: usize,
    output: Option<Tensor>,
    /// 各输出位置的激活导数缓存
    derivative: Option<Tensor>,
    last_input: Option<Tensor>,
    error: Option<Tensor>,
}

impl ConvolutionalTransformer {
    pub fn new(kernel: Tensor, activation: Activation, stride: usize) -> Result<Self, NetError> {
        if stride == 0 {
            return Err(NetError::Configuration("卷积步幅须大于0".to_string()));
        }
        Ok(Self {
            kernel,
            activation,
            stride,
            output: None,
            derivative: None,
            last_input: None,
            error: None,
        })
    }

    /// 当前卷积核
    pub fn kernel(&self) -> &Tensor {
        &self.kernel
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl TraitTransformer for ConvolutionalTransformer {
    fn transform(&mut self, input: &Tensor, _context: &TransformContext) -> Result<(), NetError> {
        // 1. 必要的验证
        if input.dimension() != self.kernel.dimension() {
            return Err(NetError::ShapeMismatch {
                expected: vec![self.kernel.dimension()],
                got: vec![input.dimension()],
                message: "卷积核维度与输入数据维度不符".to_string(),
            });
        }
        if self.kernel.width() > input.width() || self.kernel.height() > input.height() {
            return Err(NetError::ShapeMismatch {
                expected: vec![input.width(), input.height()],
                got: vec![self.kernel.width(), self.kernel.height()],
                message: "卷积核尺寸不能超过输入尺寸".to_string(),
            });
        }

        let out_width = (input.width() - self.kernel.width() + 1) / self.stride;
        let out_height = (input.height() - self.kernel.height() + 1) / self.stride;
        if out_width == 0 || out_height == 0 {
            return Err(NetError::ShapeMismatch {
                expected: vec![1, 1],
                got: vec![out_width, out_height],
                message: "步幅过大，卷积输出尺寸为0".to_string(),
            });
        }

        // 2. 逐位置乘加：每个核对应一个输出通道样本
        let mut output = Tensor::new(out_width, out_height, self.kernel.num(), 1);
        let mut derivative = Tensor::new(out_width, out_height, self.kernel.num(), 1);

        for rn in 0..self.kernel.num() {
            for rh in 0..out_height {
                for rw in 0..out_width {
                    let mut sum = 0.0;
                    for ni in 0..input.num() {
                        for kd in 0..self.kernel.dimension() {
                            for kh in 0..self.kernel.height() {
                                for kw in 0..self.kernel.width() {
                                    sum += self.kernel[(rn, kd, kw, kh)]
                                        * input[(
                                            ni,
                                            kd,
                                            rw * self.stride + kw,
                                            rh * self.stride + kh,
                                        )];
                                }
                            }
                        }
                    }
                    output[(rn, 0, rw, rh)] = self.activation.compute(sum);
                    derivative[(rn, 0, rw, rh)] = self.activation.differentiate(sum);
                }
            }
        }

        // 3. 缓存反向传播所需的现场
        self.last_input = Some(input.clone());
        self.output = Some(output);
        self.derivative = Some(derivative);
        Ok(())
    }

    fn back_propagate(
        &mut self,
        rear_error: Option<&Tensor>,
        context: &TransformContext,
    ) -> Result<(), NetError> {
        let rear = rear_error
            .ok_or_else(|| NetError::Computation("卷积反向传播缺少后级误差".to_string()))?;
        let Self {
            kernel,
            stride,
            derivative,
            last_input,
            error,
            ..
        } = self;
        let derivative = derivative
            .as_ref()
            .ok_or_else(|| NetError::Computation("反向传播前须先执行前向变换".to_string()))?;
        let input = last_input
            .as_ref()
            .ok_or_else(|| NetError::Computation("反向传播前须先执行前向变换".to_string()))?;
        if rear.num() != derivative.num()
            || rear.width() != derivative.width()
            || rear.height() != derivative.height()
        {
            return Err(NetError::ShapeMismatch {
                expected: vec![derivative.num(), derivative.width(), derivative.height()],
                got: vec![rear.num(), rear.width(), rear.height()],
                message: "后级误差形状与卷积输出不符".to_string(),
            });
        }

        // 误差摊派只见更新前的权重，单一时间点快照
        let snapshot = kernel.clone();
        let stride = *stride;
        let mut input_error =
            Tensor::new(input.width(), input.height(), input.num(), input.dimension());

        for rn in 0..kernel.num() {
            for rh in 0..derivative.height() {
                for rw in 0..derivative.width() {
                    // 局部误差 = 缓存的激活导数 × 后级传来的误差
                    let local = derivative[(rn, 0, rw, rh)] * rear[(rn, 0, rw, rh)];
                    for ni in 0..input.num() {
                        for kd in 0..kernel.dimension() {
                            for kh in 0..kernel.height() {
                                for kw in 0..kernel.width() {
                                    let (iw, ih) = (rw * stride + kw, rh * stride + kh);
                                    input_error[(ni, kd, iw, ih)] +=
                                        local * snapshot[(rn, kd, kw, kh)];
                                    kernel[(rn, kd, kw, kh)] -=
                                        context.alpha * local * input[(ni, kd, iw, ih)];
                                }
                            }
                        }
                    }
                }
            }
        }

        *error = Some(input_error);
        Ok(())
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }

    fn error(&self) -> Option<&Tensor> {
        self.error.as_ref()
    }
}
