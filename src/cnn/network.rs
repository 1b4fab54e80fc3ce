use super::context::TransformContext;
use super::transformer::{TraitTransformer, TransformerKind};
use crate::errors::NetError;
use crate::tensor::Tensor;
use crate::training::{EpochControl, StopReason};

/// 卷积神经网络的构建器。
///
/// 按序追加转换器组成一条严格线性的链，再设各项训练超参数。
/// 构建时校验：链不能为空，且末级必须是全连接转换器（管线须终结于分类器）。
///
/// # Example
///
/// ```
/// use naive_nets::cnn::{
///     ConvolutionalNeuralNetworkBuilder, ConvolutionalTransformer, FullyConnectTransformer,
///     PoolingTransformer,
/// };
/// use naive_nets::dnn::DeepNeuralNetworkBuilder;
/// use naive_nets::functions::{MaxPooling, Relu};
/// use naive_nets::tensor::Tensor;
///
/// let kernel = Tensor::new_random(0.0, 1.0, 3, 3, 1, 1);
/// let dnn = DeepNeuralNetworkBuilder::new()
///     .layer_config(&[4, 4])
///     .build()
///     .unwrap();
/// let mut cnn = ConvolutionalNeuralNetworkBuilder::new()
///     .append(ConvolutionalTransformer::new(kernel, Relu::default().into(), 1).unwrap())
///     .append(PoolingTransformer::new(2, 2, MaxPooling.into()).unwrap())
///     .append(FullyConnectTransformer::new(dnn))
///     .alpha(0.01)
///     .build()
///     .unwrap();
///
/// let input = Tensor::new_random(0.0, 1.0, 6, 6, 1, 1);
/// let cost = cnn.train(&input, &[1.0, 0.0, 0.0, 0.0]).unwrap();
/// assert!(cost.is_finite());
/// ```
pub struct ConvolutionalNeuralNetworkBuilder {
    transformers: Vec<TransformerKind>,
    alpha: f32,
    batch_size: usize,
    max_epoch: usize,
    min_error: f32,
}

impl Default for ConvolutionalNeuralNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvolutionalNeuralNetworkBuilder {
    pub fn new() -> Self {
        Self {
            transformers: Vec::new(),
            alpha: 0.001,
            batch_size: 1,
            max_epoch: 1000,
            min_error: 0.001,
        }
    }

    /// 在链尾追加一级转换器
    pub fn append(mut self, transformer: impl Into<TransformerKind>) -> Self {
        self.transformers.push(transformer.into());
        self
    }

    /// 学习率（默认0.001）
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// 批大小（默认1，即逐样本更新）
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// 训练最大轮数（默认1000）
    pub fn max_epoch(mut self, max_epoch: usize) -> Self {
        self.max_epoch = max_epoch;
        self
    }

    /// 判定收敛的最小误差阈值（默认0.001）
    pub fn min_error(mut self, min_error: f32) -> Self {
        self.min_error = min_error;
        self
    }

    pub fn build(self) -> Result<ConvolutionalNeuralNetwork, NetError> {
        if self.transformers.is_empty() {
            return Err(NetError::Configuration("转换器配置为空".to_string()));
        }
        if !matches!(self.transformers.last(), Some(TransformerKind::FullyConnect(_))) {
            return Err(NetError::Configuration(
                "末级转换器需为全连接转换器".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(NetError::Configuration("批大小须大于0".to_string()));
        }
        if self.max_epoch == 0 {
            return Err(NetError::Configuration("最大轮数须大于0".to_string()));
        }

        Ok(ConvolutionalNeuralNetwork {
            transformers: self.transformers,
            context: TransformContext::new(
                self.alpha,
                self.batch_size,
                self.min_error,
                self.max_epoch,
            ),
            costs: Vec::new(),
        })
    }
}

/// 卷积神经网络：一条转换器链加一个共享训练上下文。
///
/// 前向是驱动循环沿“后”方向走链，每级消费前级的输出；
/// 反向沿“前”方向走链，每级以后级的误差张量为传入梯度。
/// 代价取自末级分类器，轮次策略（收敛/梯度消失/学习率减半）
/// 与深度神经网络共用同一套[`EpochControl`]。
pub struct ConvolutionalNeuralNetwork {
    transformers: Vec<TransformerKind>,
    context: TransformContext,
    /// 每轮的平均代价
    costs: Vec<f32>,
}

impl ConvolutionalNeuralNetwork {
    /// 前向计算：沿链逐级变换，首级消费上下文里的原始输入。
    pub fn compute(&mut self, tensor: &Tensor) -> Result<(), NetError> {
        self.context.input = tensor.clone();

        for i in 0..self.transformers.len() {
            let (front, back) = self.transformers.split_at_mut(i);
            let input = match front.last() {
                Some(stage) => stage
                    .output()
                    .ok_or_else(|| NetError::Computation("前级转换器尚无输出".to_string()))?,
                None => &self.context.input,
            };
            back[0].transform(input, &self.context)?;
        }
        Ok(())
    }

    /// 单样本训练步：置入标签后走一遍前向，返回末级分类器报告的损失值。
    /// 权重更新要等到批界处的[`back_propagate`](Self::back_propagate)。
    pub fn train(&mut self, tensor: &Tensor, labels: &[f32]) -> Result<f32, NetError> {
        self.context.labels = labels.to_vec();
        self.compute(tensor)?;
        Ok(self.classifier().cost())
    }

    /// 批界处的反向传播：从末级分类器起沿链回走，
    /// 每级拿后级算出的误差张量做本级的梯度计算与权重更新。
    pub fn back_propagate(&mut self) -> Result<(), NetError> {
        for i in (0..self.transformers.len()).rev() {
            let (front, back) = self.transformers.split_at_mut(i + 1);
            let rear_error = back.first().and_then(|stage| stage.error());
            front[i].back_propagate(rear_error, &self.context)?;
        }
        Ok(())
    }

    /// 按传入数据集训练至终止条件（收敛/梯度消失/达到最大轮数）。
    pub fn train_set(
        &mut self,
        datas: &[Tensor],
        labels: &[Vec<f32>],
    ) -> Result<StopReason, NetError> {
        self.train_set_with(datas, labels, |_, _| {})
    }

    /// 同[`train_set`](Self::train_set)，另带每轮结束回调`(轮次, 平均代价)`。
    pub fn train_set_with<F>(
        &mut self,
        datas: &[Tensor],
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
        let batch_size = self.context.batch_size;
        let mut control = EpochControl::new(self.context.min_error, self.context.max_epoch);
        loop {
            let mut epoch_cost = 0.0;
            for (i, (data, label)) in datas.iter().zip(labels).enumerate() {
                epoch_cost += self.train(data, label)?;

                // 批界：攒够一批，或这已是本轮最后一个样本
                let len = i + 1;
                if len == data_len || (len >= batch_size && len % batch_size == 0) {
                    self.back_propagate()?;
                }
            }

            let avg_cost = epoch_cost / data_len as f32;
            self.costs.push(avg_cost);
            on_epoch_end(control.epoch(), avg_cost);

            if let Some(reason) = control.finish_epoch(avg_cost, &mut self.context.alpha) {
                return Ok(reason);
            }
        }
    }

    /// 末级分类器的输出张量（尚未前向过则为`None`）
    pub fn output(&self) -> Option<&Tensor> {
        self.classifier().output()
    }

    /// 每轮的平均代价列表
    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    /// 共享的训练上下文（学习率等经它观察）
    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// 链上各级转换器（按前向顺序）
    pub fn transformers(&self) -> &[TransformerKind] {
        &self.transformers
    }

    fn classifier(&self) -> &super::fully_connect::FullyConnectTransformer {
        match self.transformers.last() {
            Some(TransformerKind::FullyConnect(fc)) => fc,
            _ => unreachable!("构建器已校验末级为全连接转换器"),
        }
    }
}
