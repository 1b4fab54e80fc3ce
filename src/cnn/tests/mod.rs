mod convolution;
mod fully_connect;

use super::TransformContext;

/// 测试用上下文
fn context() -> TransformContext {
    TransformContext::new(0.1, 1, 0.001, 10)
}
