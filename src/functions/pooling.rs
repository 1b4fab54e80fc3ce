use enum_dispatch::enum_dispatch;
use ndarray::{Array2, ArrayView2};

/// 池化函数的闭集（枚举分发）
#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum Pooling {
    Max(MaxPooling),
    Avg(AvgPooling),
}

#[enum_dispatch(Pooling)]
pub trait TraitPooling {
    /// 把一个池化窗口归并为单个标量
    fn compute(&self, window: ArrayView2<f32>) -> f32;

    /// 返回与窗口同形的梯度掩码
    fn differentiate(&self, window: ArrayView2<f32>) -> Array2<f32>;
}

/// 最大值池化：取窗口内最大值；
/// 其掩码在每个等于最大值的位置为1（并列者都拿梯度），其余为0。
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPooling;

impl TraitPooling for MaxPooling {
    fn compute(&self, window: ArrayView2<f32>) -> f32 {
        window.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    fn differentiate(&self, window: ArrayView2<f32>) -> Array2<f32> {
        let max = self.compute(window);
        window.map(|&x| if x == max { 1.0 } else { 0.0 })
    }
}

/// 平均值池化：取窗口内均值；其掩码均匀为`1/窗口元素数`。
#[derive(Debug, Clone, Copy, Default)]
pub struct AvgPooling;

impl TraitPooling for AvgPooling {
    fn compute(&self, window: ArrayView2<f32>) -> f32 {
        window.sum() / window.len() as f32
    }

    fn differentiate(&self, window: ArrayView2<f32>) -> Array2<f32> {
        Array2::from_elem(window.raw_dim(), 1.0 / window.len() as f32)
    }
}
