use thiserror::Error;

/// 引擎统一的错误类型。
///
/// 构建期的非法配置与运行期的形状不符都在检测处立即失败，
/// 绝不静默吞掉——否则一次训练的结果将无从解释。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    /// 构建器状态非法（层数过少、转换器链为空、末级非分类器等）
    #[error("配置错误：{0}")]
    Configuration(String),

    /// 张量/卷积核/向量在变换或训练时的维度不一致
    #[error("形状不匹配（期望{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 不该出现的内部状态。触及本错误说明crate代码有问题
    #[error("计算错误：{0}")]
    Computation(String),
}
