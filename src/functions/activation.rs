use enum_dispatch::enum_dispatch;

/// 激活函数的闭集（枚举分发）
#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum Activation {
    Relu(Relu),
    Identity(Identity),
}

impl Default for Activation {
    fn default() -> Self {
        Relu::default().into()
    }
}

#[enum_dispatch(Activation)]
pub trait TraitActivation {
    /// 计算`y = f(x)`
    fn compute(&self, x: f32) -> f32;

    /// 求`x`处的导数`dy/dx`
    fn differentiate(&self, x: f32) -> f32;
}

/// 带泄漏系数的ReLU
///
/// forward: f(x) = x if x >= 0, else k * x
/// backward: d(f)/dx = 1 if x >= 0, else k
///
/// 泄漏系数k = 0时即标准ReLU
#[derive(Debug, Clone, Copy, Default)]
pub struct Relu {
    leak: f32,
}

impl Relu {
    /// 创建带泄漏系数`leak`的ReLU。系数须为非负数，否则panic。
    pub fn new(leak: f32) -> Self {
        assert!(leak >= 0.0, "ReLU的泄漏系数须为非负数，实际为{leak}");
        Self { leak }
    }
}

impl TraitActivation for Relu {
    fn compute(&self, x: f32) -> f32 {
        if x >= 0.0 { x } else { self.leak * x }
    }

    fn differentiate(&self, x: f32) -> f32 {
        if x >= 0.0 { 1.0 } else { self.leak }
    }
}

/// 原样输出：y = x，导数恒为1
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TraitActivation for Identity {
    fn compute(&self, x: f32) -> f32 {
        x
    }

    fn differentiate(&self, _x: f32) -> f32 {
        1.0
    }
}
