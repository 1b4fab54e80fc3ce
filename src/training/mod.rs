//! 轮次级训练控制：两个引擎（DNN与CNN）各自驱动样本循环，
//! 但收敛判定、梯度消失判定与学习率自适应共用这里的同一套策略。


/// 训练终止原因。训练提前停止不是错误，而是必须让调用方可见的控制流信号。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 本轮平均代价的绝对值已低于最小误差阈值
    Converged,
    /// 本轮平均代价与上一轮完全相同（梯度消失，再训无益）
    Stagnated,
    /// 达到最大轮数仍未收敛
    MaxEpoch,
}

/// 轮次控制器：吃进每轮的平均代价，给出继续/停止的决定，
/// 并在代价变大（过冲）时原地把学习率减半。
#[derive(Debug, Clone)]
pub struct EpochControl {
    min_error: f32,
    max_epoch: usize,
    epoch: usize,
    last_cost: Option<f32>,
}

impl EpochControl {
    pub fn new(min_error: f32, max_epoch: usize) -> Self {
        Self {
            min_error,
            max_epoch,
            epoch: 0,
            last_cost: None,
        }
    }

    /// 已完成的轮数（从0计）
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// 一轮结束时调用。返回`Some(原因)`表示训练应当停止；
    /// 返回`None`则继续下一轮（代价变大时`alpha`已被减半）。
    pub fn finish_epoch(&mut self, avg_cost: f32, alpha: &mut f32) -> Option<StopReason> {
        if avg_cost.abs() <= self.min_error {
            return Some(StopReason::Converged);
        }

        if let Some(last) = self.last_cost {
            if avg_cost == last {
                return Some(StopReason::Stagnated);
            }
            if avg_cost > last {
                // 误差变大说明步子迈过头了，减小学习率
                *alpha /= 2.0;
            }
        }

        self.last_cost = Some(avg_cost);
        self.epoch += 1;
        if self.epoch >= self.max_epoch {
            return Some(StopReason::MaxEpoch);
        }
        None
    }
}
