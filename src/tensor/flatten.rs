use super::Tensor;
use crate::errors::NetError;

// 展平与回填共用同一套嵌套顺序（样本→通道→高→宽），这是一条往返不变式：
// `fill(flatten(T)) == T`。展平结果用于喂给全连接网络的输入层，
// 回填用于把输入层误差还原回张量。
impl Tensor {
    /// 按固定顺序（样本→通道→高→宽）把所有标量展平成一维序列。
    pub fn flatten(&self) -> Vec<f32> {
        // 存储本身就是[num, dimension, height, width]的C序，直接枚举即可
        self.data.iter().copied().collect()
    }

    /// `flatten`的逆操作：把一维序列按同一顺序回填进本张量。
    /// 序列长度与张量元素个数不符时返回[`NetError::ShapeMismatch`]。
    pub fn fill(&mut self, flat: &[f32]) -> Result<(), NetError> {
        if flat.len() != self.len() {
            return Err(NetError::ShapeMismatch {
                expected: vec![self.len()],
                got: vec![flat.len()],
                message: "回填序列长度与张量元素个数不符".to_string(),
            });
        }

        for (dst, src) in self.data.iter_mut().zip(flat) {
            *dst = *src;
        }
        Ok(())
    }

    /// 以一维序列直接构造张量（先按形状零填充，再回填）。
    pub fn from_flat(
        flat: &[f32],
        width: usize,
        height: usize,
        num: usize,
        dimension: usize,
    ) -> Result<Self, NetError> {
        let mut tensor = Self::new(width, height, num, dimension);
        tensor.fill(flat)?;
        Ok(tensor)
    }
}
