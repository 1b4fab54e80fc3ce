use ndarray::{Array4, ArrayView2, ArrayView3, ArrayViewMut2, s};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod flatten;
mod index;


/// 4维张量：形状固定为（样本数num × 通道数dimension × 高height × 宽width），
/// 内容可变。既可按完整坐标`(n, d, w, h)`读写单个标量，
/// 也可按`(n)`、`(n, d)`取更粗粒度的切片视图。
///
/// 注：内部存储轴顺序为`[num, dimension, height, width]`，
/// 对外索引统一用`(n, d, w, h)`的顺序，转换在索引处完成。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array4<f32>,
}

impl Tensor {
    /// 创建一个按给定形状零填充的张量。
    /// 四个尺度都必须为正整数，且构建后不可再变，否则panic。
    pub fn new(width: usize, height: usize, num: usize, dimension: usize) -> Self {
        assert!(
            width > 0 && height > 0 && num > 0 && dimension > 0,
            "张量的四个尺度都须大于0，实际为（num={num}, dimension={dimension}, width={width}, height={height}）"
        );
        Tensor {
            data: Array4::zeros((num, dimension, height, width)),
        }
    }

    /// 创建一个随机张量，其值均匀分布在`[min, max)`区间（卷积核、突触权重的初始化用）。
    pub fn new_random(
        min: f32,
        max: f32,
        width: usize,
        height: usize,
        num: usize,
        dimension: usize,
    ) -> Self {
        Self::fill_random(rand::thread_rng(), min, max, width, height, num, dimension)
    }

    /// 同[`new_random`](Self::new_random)，但以给定种子初始化随机数生成器（保证可重复）。
    pub fn new_random_seeded(
        seed: u64,
        min: f32,
        max: f32,
        width: usize,
        height: usize,
        num: usize,
        dimension: usize,
    ) -> Self {
        Self::fill_random(
            StdRng::seed_from_u64(seed),
            min,
            max,
            width,
            height,
            num,
            dimension,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_random(
        mut rng: impl Rng,
        min: f32,
        max: f32,
        width: usize,
        height: usize,
        num: usize,
        dimension: usize,
    ) -> Self {
        let uniform = Uniform::new(min, max);
        let mut tensor = Self::new(width, height, num, dimension);
        for x in tensor.data.iter_mut() {
            *x = uniform.sample(&mut rng);
        }
        tensor
    }

    /// 样本数
    pub fn num(&self) -> usize {
        self.data.shape()[0]
    }

    /// 通道数
    pub fn dimension(&self) -> usize {
        self.data.shape()[1]
    }

    /// 高
    pub fn height(&self) -> usize {
        self.data.shape()[2]
    }

    /// 宽
    pub fn width(&self) -> usize {
        self.data.shape()[3]
    }

    /// 元素总个数（num × dimension × width × height）
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 取第`n`个样本的3维只读视图（通道 × 高 × 宽）
    pub fn sample(&self, n: usize) -> ArrayView3<f32> {
        self.data.slice(s![n, .., .., ..])
    }

    /// 取第`n`个样本、第`d`个通道的2维只读视图（高 × 宽）
    pub fn plane(&self, n: usize, d: usize) -> ArrayView2<f32> {
        self.data.slice(s![n, d, .., ..])
    }

    /// 取第`n`个样本、第`d`个通道的2维可写视图（高 × 宽）
    pub fn plane_mut(&mut self, n: usize, d: usize) -> ArrayViewMut2<f32> {
        self.data.slice_mut(s![n, d, .., ..])
    }
}
