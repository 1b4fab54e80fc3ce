use crate::errors::NetError;

// softmax是固定加在输出层与损失函数之间的归一化，不参与函数插拔。

/// softmax归一化：`exp(raw[i]) / Σ exp(raw[j])`
pub fn softmax(index: usize, raw: &[f32]) -> f32 {
    let sum: f32 = raw.iter().map(|&x| x.exp()).sum();
    raw[index].exp() / sum
}

/// 给定下游对每个softmax输出的梯度`grads`，
/// 求损失对第`index`个softmax前原始值的偏导：
///
/// ```text
/// Σ_j grads[j]·s[j]·(δ_ij − s[index])
/// ```
///
/// 两个向量长度不一致时返回[`NetError::ShapeMismatch`]。
pub fn softmax_backward(
    index: usize,
    softmax_output: &[f32],
    grads: &[f32],
) -> Result<f32, NetError> {
    if softmax_output.len() != grads.len() {
        return Err(NetError::ShapeMismatch {
            expected: vec![softmax_output.len()],
            got: vec![grads.len()],
            message: "softmax输出与梯度向量长度不一致".to_string(),
        });
    }

    let current = softmax_output[index];
    let mut result = 0.0;
    for (j, (&s, &g)) in softmax_output.iter().zip(grads).enumerate() {
        if j == index {
            result += g * (1.0 - current) * current;
        } else {
            result += g * -current * s;
        }
    }
    Ok(result)
}
