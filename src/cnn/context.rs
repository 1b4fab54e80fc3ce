use crate::tensor::Tensor;

/// 整条转换器链共享的训练上下文。
///
/// 一次完整的训练各持一个实例：输入与标签每个样本都会被替换，
/// 超参数在训练开始前设定一次，其中学习率会随训练自适应（过冲时减半）。
/// 按引用显式传进每级转换器的调用，不做任何全局状态。
pub struct TransformContext {
    /// 当前样本的原始输入
    pub(crate) input: Tensor,
    /// 当前样本的one-hot标签
    pub(crate) labels: Vec<f32>,
    /// 学习率
    pub(crate) alpha: f32,
    /// 更新权重的批大小
    pub(crate) batch_size: usize,
    /// 最小误差阈值
    pub(crate) min_error: f32,
    /// 训练最大轮数
    pub(crate) max_epoch: usize,
}

impl TransformContext {
    pub(crate) fn new(alpha: f32, batch_size: usize, min_error: f32, max_epoch: usize) -> Self {
        Self {
            input: Tensor::new(1, 1, 1, 1),
            labels: Vec::new(),
            alpha,
            batch_size,
            min_error,
            max_epoch,
        }
    }

    /// 当前学习率
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// 当前样本的one-hot标签
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }
}
