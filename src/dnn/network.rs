use super::neuron::{Neuron, NeuronId, NeuronKind, Synapse};
use crate::errors::NetError;
use crate::functions::{Activation, Loss, TraitActivation, TraitLoss, softmax, softmax_backward};
use crate::training::{EpochControl, StopReason};

/// 深度神经网络
///
/// 单个训练步分两个阶段：
/// - 计算（[`compute`](Self::compute)）：前向逐层填充每个神经元的加权输入和与激活输出，
///   末层再做softmax归一化；
/// - 打分（[`train_step`](Self::train_step)）：损失导数经softmax链式回传，
///   按批累积进输出神经元的误差和。
///
/// 批界处（[`back_propagate`](Self::back_propagate)）才真正回推误差并更新突触权重；
/// 轮次循环（[`train`](Self::train)）负责收敛判定与学习率自适应。
pub struct DeepNeuralNetwork {
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    /// 按层排列的神经元下标（非输出层末尾多一个偏置）
    layers: Vec<Vec<NeuronId>>,
    layer_config: Vec<usize>,
    activation: Activation,
    loss: Loss,
    alpha: f32,
    batch_size: usize,
    max_epoch: usize,
    min_error: f32,
    /// 末层原始输出
    output: Vec<f32>,
    /// 末层输出（经softmax归一化后）
    softmax_output: Vec<f32>,
    /// 损失函数对每个softmax输出的导数缓冲
    derive_buf: Vec<f32>,
    /// 每轮的平均代价
    costs: Vec<f32>,
    /// 自上次权重更新以来打分过的样本数
    train_count: usize,
}

impl DeepNeuralNetwork {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        neurons: Vec<Neuron>,
        synapses: Vec<Synapse>,
        layers: Vec<Vec<NeuronId>>,
        layer_config: Vec<usize>,
        activation: Activation,
        loss: Loss,
        alpha: f32,
        batch_size: usize,
        max_epoch: usize,
        min_error: f32,
    ) -> Self {
        let output_len = *layer_config.last().expect("构建器已校验层数不低于2");
        Self {
            neurons,
            synapses,
            layers,
            layer_config,
            activation,
            loss,
            alpha,
            batch_size,
            max_epoch,
            min_error,
            output: vec![0.0; output_len],
            softmax_output: vec![0.0; output_len],
            derive_buf: vec![0.0; output_len],
            costs: Vec::new(),
            train_count: 0,
        }
    }

    /// 前向计算：置入输入后逐层（输入→输出）算出每个神经元的
    /// 加权输入和与激活输出，末层再做softmax。
    pub fn compute(&mut self, input: &[f32]) -> Result<(), NetError> {
        self.set_input(input)?;

        for li in 1..self.layers.len() {
            for ni in 0..self.layers[li].len() {
                let id = self.layers[li][ni];
                if self.neurons[id.0].kind == NeuronKind::Input {
                    continue; // 偏置恒为1，不参与计算
                }

                let mut sum = 0.0;
                for &sid in &self.neurons[id.0].front {
                    let synapse = &self.synapses[sid.0];
                    sum += self.neurons[synapse.front.0].output * synapse.weight;
                }

                let neuron = &mut self.neurons[id.0];
                neuron.input = sum;
                neuron.output = self.activation.compute(sum);
            }
        }

        let last = self.layers.len() - 1;
        for (i, &id) in self.layers[last].iter().enumerate() {
            self.output[i] = self.neurons[id.0].output;
        }
        for i in 0..self.output.len() {
            self.softmax_output[i] = softmax(i, &self.output);
        }
        Ok(())
    }

    /// 单样本训练步（计算+打分）：前向计算后，把损失导数经softmax链式回传，
    /// 累积进输出神经元的误差和，并返回本样本的损失值。
    /// 权重此时还不动，要等到批界处的[`back_propagate`](Self::back_propagate)。
    pub fn train_step(&mut self, input: &[f32], labels: &[f32]) -> Result<f32, NetError> {
        if labels.len() != self.output.len() {
            return Err(NetError::ShapeMismatch {
                expected: vec![self.output.len()],
                got: vec![labels.len()],
                message: "标签长度与输出层大小不符".to_string(),
            });
        }

        self.compute(input)?;

        // dL/ds：损失对每个softmax输出的导数
        for i in 0..self.output.len() {
            let derive = self.loss.differentiate(i, &self.softmax_output, labels);
            self.derive_buf[i] = derive;
        }

        // ds/dz：经softmax回传到每个原始输出，按批累积
        let last = self.layers.len() - 1;
        for i in 0..self.output.len() {
            let error = softmax_backward(i, &self.softmax_output, &self.derive_buf)?;
            let id = self.layers[last][i];
            self.neurons[id.0].error_sum += error;
        }

        self.train_count += 1;
        self.loss.compute(&self.softmax_output, labels)
    }

    /// 批界处的反向传播与权重更新：
    /// 1. 所有神经元误差清零，输出层以累积误差的批均值为起点；
    /// 2. 逐层后推——神经元误差 = 传入误差 × 激活导数（输入神经元不过激活，原样记下），
    ///    再按前端突触权重把误差继续摊派给更前一层；
    /// 3. 误差推完后统一更新权重：`weight -= α × 后端误差 × 前端输出`
    ///    （误差推算始终只见更新前的权重，单一时间点快照）；
    /// 4. 清空输出层误差累积。
    ///
    /// 本批没有打分过任何样本时为空操作。
    pub fn back_propagate(&mut self) {
        if self.train_count == 0 {
            return;
        }
        let count = self.train_count as f32;

        for neuron in &mut self.neurons {
            neuron.error = 0.0;
        }

        let mut incoming = vec![0.0f32; self.neurons.len()];
        let last = self.layers.len() - 1;
        for &id in &self.layers[last] {
            incoming[id.0] = self.neurons[id.0].error_sum / count;
        }

        for li in (0..self.layers.len()).rev() {
            for &id in &self.layers[li] {
                let error = match self.neurons[id.0].kind {
                    NeuronKind::Input => incoming[id.0],
                    _ => incoming[id.0] * self.activation.differentiate(self.neurons[id.0].input),
                };
                self.neurons[id.0].error = error;

                for &sid in &self.neurons[id.0].front {
                    let synapse = &self.synapses[sid.0];
                    incoming[synapse.front.0] += error * synapse.weight;
                }
            }
        }

        for synapse in &mut self.synapses {
            synapse.weight -=
                self.alpha * self.neurons[synapse.rear.0].error * self.neurons[synapse.front.0].output;
        }

        for &id in &self.layers[last] {
            self.neurons[id.0].error_sum = 0.0;
        }
        self.train_count = 0;
    }

    /// 按传入数据集训练至终止条件（收敛/梯度消失/达到最大轮数）。
    pub fn train(&mut self, datas: &[Vec<f32>], labels: &[Vec<f32>]) -> Result<StopReason, NetError> {
        self.train_with(datas, labels, |_, _| {})
    }

    /// 同[`train`](Self::train)，另带每轮结束回调`(轮次, 平均代价)`。
    /// 回调是只观察不干预的通知点，对训练状态没有任何影响。
    pub fn train_with<F>(
        &mut self,
        datas: &[Vec<f32>],
        labels: &[Vec<f32>],
        mut on_epoch_end: F,
    ) -> Result<StopReason, NetError>
    where
        F: FnMut(usize, f32),
    {
        if datas.len() != labels.len() {
            return Err(NetError::ShapeMismatch {
                expected: vec![datas.len()],
                got: vec![labels.len()],
                message: "样本数量与标签数量不一致".to_string(),
            });
        }
        if datas.is_empty() {
            return Err(NetError::Configuration("训练样本为空".to_string()));
        }

        self.costs.clear();
        let data_len = datas.len();
        let mut control = EpochControl::new(self.min_error, self.max_epoch);
        loop {
            let mut epoch_cost = 0.0;
            for (i, (data, label)) in datas.iter().zip(labels).enumerate() {
                epoch_cost += self.train_step(data, label)?;

                // 批界：攒够一批，或这已是本轮最后一个样本
                let len = i + 1;
                if len == data_len || (len >= self.batch_size && len % self.batch_size == 0) {
                    self.back_propagate();
                }
            }

            let avg_cost = epoch_cost / data_len as f32;
            self.costs.push(avg_cost);
            on_epoch_end(control.epoch(), avg_cost);

            if let Some(reason) = control.finish_epoch(avg_cost, &mut self.alpha) {
                return Ok(reason);
            }
        }
    }
}

// 只读访问（外部协作方如图表渲染按此读取，绝不回写引擎状态）
impl DeepNeuralNetwork {
    /// 末层原始输出
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// 末层输出（经softmax归一化后）
    pub fn softmax_output(&self) -> &[f32] {
        &self.softmax_output
    }

    /// 每轮的平均代价列表
    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    /// 当前学习率
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// 覆写学习率（卷积管线在批界处把上下文里自适应后的学习率同步进来）
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// 输入层真实神经元（不含偏置）的数量
    pub fn input_size(&self) -> usize {
        self.layer_config[0]
    }

    /// 输出层神经元数量
    pub fn output_size(&self) -> usize {
        self.output.len()
    }

    /// 输入层真实神经元（不含偏置）的当前误差，按输入顺序排列。
    /// 全连接转换器靠它把误差还原回前级张量。
    pub fn input_errors(&self) -> Vec<f32> {
        let size = self.layer_config[0];
        self.layers[0][..size]
            .iter()
            .map(|&id| self.neurons[id.0].error)
            .collect()
    }

    /// 所有突触权重的快照（按构图顺序）
    pub fn synapse_weights(&self) -> Vec<f32> {
        self.synapses.iter().map(|s| s.weight).collect()
    }

    pub(crate) fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    pub(crate) fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }
}

impl DeepNeuralNetwork {
    fn set_input(&mut self, input: &[f32]) -> Result<(), NetError> {
        let expected = self.layer_config[0];
        if input.len() != expected {
            return Err(NetError::ShapeMismatch {
                expected: vec![expected],
                got: vec![input.len()],
                message: "输入长度与输入层大小不符（不含偏置）".to_string(),
            });
        }

        for (i, &x) in input.iter().enumerate() {
            let id = self.layers[0][i];
            let neuron = &mut self.neurons[id.0];
            neuron.input = x;
            neuron.output = x;
        }
        Ok(())
    }
}
