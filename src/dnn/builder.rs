use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use super::network::DeepNeuralNetwork;
use super::neuron::{Neuron, NeuronId, NeuronKind, Synapse, SynapseId};
use crate::errors::NetError;
use crate::functions::{Activation, Loss};

/// 深度神经网络的流式构建器
///
/// # 使用示例
/// ```
/// use naive_nets::dnn::DeepNeuralNetworkBuilder;
/// use naive_nets::functions::{CrossEntropy, Relu};
///
/// let net = DeepNeuralNetworkBuilder::new()
///     .layer_config(&[784, 30, 10])
///     .activation(Relu::new(0.1))
///     .loss(CrossEntropy)
///     .alpha(0.01)
///     .batch_size(10)
///     .build()
///     .unwrap();
/// ```
pub struct DeepNeuralNetworkBuilder {
    layer_config: Option<Vec<usize>>,
    activation: Activation,
    loss: Loss,
    alpha: f32,
    batch_size: usize,
    max_epoch: usize,
    min_error: f32,
    seed: Option<u64>,
}

impl Default for DeepNeuralNetworkBuilder {
    fn default() -> Self {
        Self {
            layer_config: None,
            activation: Activation::default(),
            loss: Loss::default(),
            alpha: 0.001,
            batch_size: 1,
            max_epoch: 10000,
            min_error: 0.001,
            seed: None,
        }
    }
}

impl DeepNeuralNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置分层配置：每层真实神经元的数量（偏置神经元由构建器自动补足）
    pub fn layer_config(mut self, config: &[usize]) -> Self {
        self.layer_config = Some(config.to_vec());
        self
    }

    /// 设置激活函数
    pub fn activation(mut self, activation: impl Into<Activation>) -> Self {
        self.activation = activation.into();
        self
    }

    /// 设置损失函数
    pub fn loss(mut self, loss: impl Into<Loss>) -> Self {
        self.loss = loss.into();
        self
    }

    /// 设置学习率
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// 设置更新权重的批大小
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// 设置训练最大轮数，超过即终止
    pub fn max_epoch(mut self, max_epoch: usize) -> Self {
        self.max_epoch = max_epoch;
        self
    }

    /// 设置最小误差阈值，每轮平均代价低于它即收敛
    pub fn min_error(mut self, min_error: f32) -> Self {
        self.min_error = min_error;
        self
    }

    /// 设置权重初始化的随机种子（保证可重复）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DeepNeuralNetwork, NetError> {
        // 1. 配置校验
        let config = self
            .layer_config
            .ok_or_else(|| NetError::Configuration("未设置分层配置".to_string()))?;
        if config.len() < 2 {
            return Err(NetError::Configuration("层数不能低于2".to_string()));
        }
        if config.iter().any(|&size| size == 0) {
            return Err(NetError::Configuration(
                "每层神经元数量须大于0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(NetError::Configuration("批大小须大于0".to_string()));
        }
        if self.max_epoch == 0 {
            return Err(NetError::Configuration("最大轮数须大于0".to_string()));
        }

        // 2. 逐层创建神经元，除输出层外每层都多补一个偏置输入神经元
        let mut neurons = Vec::new();
        let mut layers: Vec<Vec<NeuronId>> = Vec::with_capacity(config.len());
        for (li, &size) in config.iter().enumerate() {
            let is_first = li == 0;
            let is_last = li + 1 == config.len();

            let mut layer = Vec::with_capacity(size + 1);
            for _ in 0..size {
                let kind = if is_first {
                    NeuronKind::Input
                } else if is_last {
                    NeuronKind::Output
                } else {
                    NeuronKind::Hidden
                };
                layer.push(push_neuron(&mut neurons, kind));
            }
            if !is_last {
                // 偏置：恒定输出1的输入神经元，排在本层真实神经元之后
                layer.push(push_neuron(&mut neurons, NeuronKind::Input));
            }
            layers.push(layer);
        }

        // 3. 相邻层全连接：第i层（含偏置）每个神经元连到第i+1层每个真实神经元，
        //    权重随机初始化在[0, 1)
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let uniform = Uniform::new(0.0f32, 1.0);
        let mut synapses = Vec::new();
        for li in 0..layers.len() - 1 {
            let rear_real = config[li + 1];
            for &front in &layers[li] {
                for &rear in &layers[li + 1][..rear_real] {
                    let sid = SynapseId(synapses.len());
                    synapses.push(Synapse {
                        weight: uniform.sample(&mut rng),
                        front,
                        rear,
                    });
                    neurons[front.0].rear.push(sid);
                    neurons[rear.0].front.push(sid);
                }
            }
        }

        Ok(DeepNeuralNetwork::new(
            neurons,
            synapses,
            layers,
            config,
            self.activation,
            self.loss,
            self.alpha,
            self.batch_size,
            self.max_epoch,
            self.min_error,
        ))
    }
}

fn push_neuron(neurons: &mut Vec<Neuron>, kind: NeuronKind) -> NeuronId {
    let id = NeuronId(neurons.len());
    neurons.push(Neuron::new(kind));
    id
}
