use enum_dispatch::enum_dispatch;

use super::context::TransformContext;
use super::convolution::ConvolutionalTransformer;
use super::fully_connect::FullyConnectTransformer;
use super::pooling::PoolingTransformer;
use crate::errors::NetError;
use crate::tensor::Tensor;

/// 管线中的一级转换器（枚举分发的闭集）
#[enum_dispatch]
pub enum TransformerKind {
    Convolutional(ConvolutionalTransformer),
    Pooling(PoolingTransformer),
    FullyConnect(FullyConnectTransformer),
}

#[enum_dispatch(TransformerKind)]
pub trait TraitTransformer {
    /// 前向变换：消费前级的输出（链首则为上下文里的原始输入），
    /// 产出并缓存本级的输出张量。
    fn transform(&mut self, input: &Tensor, context: &TransformContext) -> Result<(), NetError>;

    /// 反向传播：以后级的误差张量为传入梯度，做本级的局部梯度计算与权重更新，
    /// 产出并缓存本级的误差张量。链尾分类器没有后级，忽略`rear_error`。
    fn back_propagate(
        &mut self,
        rear_error: Option<&Tensor>,
        context: &TransformContext,
    ) -> Result<(), NetError>;

    /// 最近一次前向变换的输出张量
    fn output(&self) -> Option<&Tensor>;

    /// 最近一次反向传播算出的误差张量
    fn error(&self) -> Option<&Tensor>;
}
