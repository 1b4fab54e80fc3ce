//! 神经元与突触的存储单元。
//!
//! 神经元与突触分别放在两个以下标寻址的arena里，
//! 双向关联（神经元↔突触）一律存下标对而非引用，构图完成后不再改动，
//! 前向/反向的状态字段则每个训练步都会被覆写。

/// 神经元在arena中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NeuronId(pub(crate) usize);

/// 突触在arena中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SynapseId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NeuronKind {
    /// 输入神经元（可被外部置值；偏置源恒定输出1）
    Input,
    Hidden,
    Output,
}

#[derive(Debug, Clone)]
pub(crate) struct Neuron {
    pub(crate) kind: NeuronKind,
    /// 当前加权输入和
    pub(crate) input: f32,
    /// 当前输出（激活后）
    pub(crate) output: f32,
    /// 当前误差
    pub(crate) error: f32,
    /// 按批累积的误差（仅输出神经元使用）
    pub(crate) error_sum: f32,
    /// 前端（上一层方向）突触
    pub(crate) front: Vec<SynapseId>,
    /// 后端（下一层方向）突触
    pub(crate) rear: Vec<SynapseId>,
}

impl Neuron {
    pub(crate) fn new(kind: NeuronKind) -> Self {
        // 输入神经元默认置1，正好充当偏置源；真实输入会在每个样本前被覆写
        let initial = if kind == NeuronKind::Input { 1.0 } else { 0.0 };
        Self {
            kind,
            input: initial,
            output: initial,
            error: 0.0,
            error_sum: 0.0,
            front: Vec::new(),
            rear: Vec::new(),
        }
    }
}

/// 突触：两个神经元之间带权重的有向边。
/// 端点以下标弱关联（生命周期归网络所有），只有权重可变。
#[derive(Debug, Clone)]
pub(crate) struct Synapse {
    pub(crate) weight: f32,
    pub(crate) front: NeuronId,
    pub(crate) rear: NeuronId,
}
