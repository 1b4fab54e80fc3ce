use enum_dispatch::enum_dispatch;

use crate::errors::NetError;

/// 损失函数的闭集（枚举分发）
#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum Loss {
    CrossEntropy(CrossEntropy),
    MeanSquared(MeanSquared),
}

impl Default for Loss {
    fn default() -> Self {
        CrossEntropy.into()
    }
}

#[enum_dispatch(Loss)]
pub trait TraitLoss {
    /// 计算整体损失。`output`为softmax后的输出，`labels`为one-hot标签，
    /// 两者长度不一致时返回[`NetError::ShapeMismatch`]。
    fn compute(&self, output: &[f32], labels: &[f32]) -> Result<f32, NetError>;

    /// 求损失对第`index`个（softmax后）输出的偏导。
    /// 长度校验由同一样本上先行的`compute`完成。
    fn differentiate(&self, index: usize, output: &[f32], labels: &[f32]) -> f32;
}

fn check_len(output: &[f32], labels: &[f32]) -> Result<(), NetError> {
    if output.len() != labels.len() {
        return Err(NetError::ShapeMismatch {
            expected: vec![output.len()],
            got: vec![labels.len()],
            message: "输出向量与标签向量长度不一致".to_string(),
        });
    }
    Ok(())
}

/// 交叉熵损失
///
/// compute: L = -Σ label[i]·ln(output[i])
/// backward: dL/d(output[i]) = -label[i] / output[i]
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropy;

impl TraitLoss for CrossEntropy {
    fn compute(&self, output: &[f32], labels: &[f32]) -> Result<f32, NetError> {
        check_len(output, labels)?;

        let mut sum = 0.0;
        for (o, l) in output.iter().zip(labels) {
            sum -= l * o.ln();
        }
        Ok(sum)
    }

    fn differentiate(&self, index: usize, output: &[f32], labels: &[f32]) -> f32 {
        -labels[index] / output[index]
    }
}

/// 均方误差损失
///
/// compute: L = Σ (label[i] - output[i])² / (2·len)
/// backward: dL/d(output[i]) = (output[i] - label[i]) / len
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquared;

impl TraitLoss for MeanSquared {
    fn compute(&self, output: &[f32], labels: &[f32]) -> Result<f32, NetError> {
        check_len(output, labels)?;

        let mut sum = 0.0;
        for (o, l) in output.iter().zip(labels) {
            sum += (l - o) * (l - o);
        }
        Ok(sum / output.len() as f32 / 2.0)
    }

    fn differentiate(&self, index: usize, output: &[f32], labels: &[f32]) -> f32 {
        (output[index] - labels[index]) / output.len() as f32
    }
}
