/*
 * @Author       : 老董
 * @Date         : 2025-11-23 16:02:11
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-07 19:44:30
 * @Description  : 卷积管线：卷积→池化→全连接分类器的转换器链。
 *                 链是严格线性的，由驱动循环统一走链——
 *                 前向沿“后”方向逐级变换，反向沿“前”方向逐级回传误差，
 *                 整条链共享一个可变的训练上下文。
 */

mod context;
mod convolution;
mod fully_connect;
mod network;
mod pooling;
mod transformer;

pub use context::TransformContext;
pub use convolution::ConvolutionalTransformer;
pub use fully_connect::FullyConnectTransformer;
pub use network::{ConvolutionalNeuralNetwork, ConvolutionalNeuralNetworkBuilder};
pub use pooling::PoolingTransformer;
pub use transformer::{TraitTransformer, TransformerKind};

#[cfg(test)]
mod tests;
