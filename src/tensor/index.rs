use std::ops::{Index, IndexMut};

use super::Tensor;

// 按完整坐标(n, d, w, h)索引单个标量，越界即panic（ndarray自带边界检查）
impl Index<(usize, usize, usize, usize)> for Tensor {
    type Output = f32;

    fn index(&self, (n, d, w, h): (usize, usize, usize, usize)) -> &f32 {
        &self.data[[n, d, h, w]]
    }
}

impl IndexMut<(usize, usize, usize, usize)> for Tensor {
    fn index_mut(&mut self, (n, d, w, h): (usize, usize, usize, usize)) -> &mut f32 {
        &mut self.data[[n, d, h, w]]
    }
}
