use approx::assert_abs_diff_eq;

use crate::dnn::DeepNeuralNetworkBuilder;
use crate::functions::{Identity, MeanSquared, TraitLoss, softmax, softmax_backward};

/// [3,1]无隐藏层+原样激活+均方误差：单步训练后每条输入突触的权重增量
/// 须等于闭式梯度 `α × (预测值 − 标签) × 输入值`。
/// 注：单输出时softmax恒饱和为1，预测值即1。
#[test]
fn test_single_output_weight_delta_matches_closed_form() {
    let alpha = 0.5;
    let mut net = DeepNeuralNetworkBuilder::new()
        .layer_config(&[3, 1])
        .activation(Identity)
        .loss(MeanSquared)
        .alpha(alpha)
        .seed(3)
        .build()
        .unwrap();
    let before = net.synapse_weights();

    let input = [0.2f32, 0.8, -0.4];
    let labels = [1.0f32];
    net.train_step(&input, &labels).unwrap();
    net.back_propagate();
    let after = net.synapse_weights();

    let prediction = net.softmax_output()[0];
    assert_abs_diff_eq!(prediction, 1.0);

    // 前端依次为[x0, x1, x2, 偏置]，各连唯一的输出神经元
    let front_outputs = [input[0], input[1], input[2], 1.0];
    for (i, &x) in front_outputs.iter().enumerate() {
        let expected_delta = alpha * (prediction - labels[0]) * x;
        assert_abs_diff_eq!(before[i] - after[i], expected_delta, epsilon = 1e-6);
    }
}

/// [3,2]两输出变体：经softmax链完整回传，
/// 与测试里独立重算的梯度逐条比对。
#[test]
fn test_two_output_weight_delta_matches_recomputed_gradient() {
    let alpha = 0.1;
    let mut net = DeepNeuralNetworkBuilder::new()
        .layer_config(&[3, 2])
        .activation(Identity)
        .loss(MeanSquared)
        .alpha(alpha)
        .seed(11)
        .build()
        .unwrap();
    let w = net.synapse_weights();

    let input = [0.5f32, -0.3, 0.9];
    let labels = [1.0f32, 0.0];

    // 独立重算：加权和 → softmax → 损失导数 → softmax反传 → 权重增量
    let front_outputs = [input[0], input[1], input[2], 1.0];
    let mut raw = [0.0f32; 2];
    for (fi, &x) in front_outputs.iter().enumerate() {
        for oj in 0..2 {
            raw[oj] += x * w[fi * 2 + oj];
        }
    }
    let s = [softmax(0, &raw), softmax(1, &raw)];
    let grads = [
        MeanSquared.differentiate(0, &s, &labels),
        MeanSquared.differentiate(1, &s, &labels),
    ];
    let errors = [
        softmax_backward(0, &s, &grads).unwrap(),
        softmax_backward(1, &s, &grads).unwrap(),
    ];

    net.train_step(&input, &labels).unwrap();
    net.back_propagate();
    let after = net.synapse_weights();

    for (fi, &x) in front_outputs.iter().enumerate() {
        for (oj, &error) in errors.iter().enumerate() {
            let idx = fi * 2 + oj;
            // 原样激活的导数为1，输出误差即链上误差
            let expected = w[idx] - alpha * error * x;
            assert_abs_diff_eq!(after[idx], expected, epsilon = 1e-6);
        }
    }
}

/// 输入层误差 = Σ 后端神经元误差 × 突触权重（全连接转换器反展平用）
#[test]
fn test_input_errors_are_weighted_sums() {
    let mut net = DeepNeuralNetworkBuilder::new()
        .layer_config(&[2, 2])
        .activation(Identity)
        .loss(MeanSquared)
        .seed(19)
        .build()
        .unwrap();
    let w = net.synapse_weights();

    let input = [0.4f32, 0.7];
    let labels = [0.0f32, 1.0];
    net.train_step(&input, &labels).unwrap();
    net.back_propagate();

    // 重算两个输出神经元的误差
    let raw = [
        input[0] * w[0] + input[1] * w[2] + w[4],
        input[0] * w[1] + input[1] * w[3] + w[5],
    ];
    let s = [softmax(0, &raw), softmax(1, &raw)];
    let grads = [
        MeanSquared.differentiate(0, &s, &labels),
        MeanSquared.differentiate(1, &s, &labels),
    ];
    let errors = [
        softmax_backward(0, &s, &grads).unwrap(),
        softmax_backward(1, &s, &grads).unwrap(),
    ];

    let input_errors = net.input_errors();
    assert_eq!(input_errors.len(), 2);
    assert_abs_diff_eq!(
        input_errors[0],
        errors[0] * w[0] + errors[1] * w[1],
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        input_errors[1],
        errors[0] * w[2] + errors[1] * w[3],
        epsilon = 1e-6
    );
}

/// 批内两个样本的输出误差按均值入账，批界后累积器清零
#[test]
fn test_batch_error_accumulator_reset() {
    let mut net = DeepNeuralNetworkBuilder::new()
        .layer_config(&[2, 2])
        .seed(23)
        .build()
        .unwrap();

    net.train_step(&[0.1, 0.9], &[1.0, 0.0]).unwrap();
    net.train_step(&[0.9, 0.1], &[0.0, 1.0]).unwrap();
    net.back_propagate();
    let after_first = net.synapse_weights();

    // 累积器已清空：再次反传是空操作，权重纹丝不动
    net.back_propagate();
    assert_eq!(net.synapse_weights(), after_first);
}
