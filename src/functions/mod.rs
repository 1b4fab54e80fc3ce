/*
 * @Author       : 老董
 * @Date         : 2025-11-08 14:12:30
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-20 10:41:02
 * @Description  : 可插拔的函数库：激活函数、池化函数、损失函数（均带求导），
 *                 以及固定不可插拔的softmax归一化。
 *                 支持的函数集合小而封闭，故用枚举分发而非开放多态。
 */

mod activation;
mod loss;
mod pooling;
mod softmax;

pub use activation::{Activation, Identity, Relu, TraitActivation};
pub use loss::{CrossEntropy, Loss, MeanSquared, TraitLoss};
pub use pooling::{AvgPooling, MaxPooling, Pooling, TraitPooling};
pub use softmax::{softmax, softmax_backward};
