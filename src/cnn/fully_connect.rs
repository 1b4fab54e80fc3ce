use super::context::TransformContext;
use super::transformer::TraitTransformer;
use crate::dnn::DeepNeuralNetwork;
use crate::errors::NetError;
use crate::tensor::Tensor;

/// 全连接转换器：管线末级的分类器，内部包一个预先构建好的深度神经网络。
///
/// 前向把输入张量展平成1维向量，连同上下文里的标签喂给内部网络走一个训练步
/// （计算+打分），softmax输出写成`(长度, 1)`的张量，本样本损失记作代价；
/// 反向先把上下文里自适应后的学习率同步给内部网络，触发其批界权重更新，
/// 再把输入层（不含偏置）的误差按展平的逆序还原成与前级输出同形的误差张量。
pub struct FullyConnectTransformer {
    dnn: DeepNeuralNetwork,
    output: Option<Tensor>,
    error: Option<Tensor>,
    /// 最近一次输入的形状（宽, 高, 样本数, 通道数），反展平用
    input_shape: Option<(usize, usize, usize, usize)>,
    cost: f32,
}

impl FullyConnectTransformer {
    pub fn new(network: DeepNeuralNetwork) -> Self {
        Self {
            dnn: network,
            output: None,
            error: None,
            input_shape: None,
            cost: 0.0,
        }
    }

    /// 最近一个样本的损失值
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// 内部的深度神经网络
    pub fn network(&self) -> &DeepNeuralNetwork {
        &self.dnn
    }
}

impl TraitTransformer for FullyConnectTransformer {
    fn transform(&mut self, input: &Tensor, context: &TransformContext) -> Result<(), NetError> {
        let flat = input.flatten();
        // 展平长度与内部网络输入层不符时由train_step报ShapeMismatch
        self.cost = self.dnn.train_step(&flat, &context.labels)?;

        let softmax = self.dnn.softmax_output();
        let output = Tensor::from_flat(softmax, softmax.len(), 1, 1, 1)?;
        self.input_shape = Some((input.width(), input.height(), input.num(), input.dimension()));
        self.output = Some(output);
        Ok(())
    }

    fn back_propagate(
        &mut self,
        _rear_error: Option<&Tensor>,
        context: &TransformContext,
    ) -> Result<(), NetError> {
        let (width, height, num, dimension) = self
            .input_shape
            .ok_or_else(|| NetError::Computation("反向传播前须先执行前向变换".to_string()))?;

        self.dnn.set_alpha(context.alpha);
        self.dnn.back_propagate();

        let input_errors = self.dnn.input_errors();
        self.error = Some(Tensor::from_flat(&input_errors, width, height, num, dimension)?);
        Ok(())
    }

    fn output(&self) -> Option<&Tensor> {
        self.output.as_ref()
    }

    fn error(&self) -> Option<&Tensor> {
        self.error.as_ref()
    }
}
