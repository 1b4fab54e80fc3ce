use approx::assert_abs_diff_eq;

use crate::cnn::{FullyConnectTransformer, TraitTransformer, TransformContext};
use crate::dnn::DeepNeuralNetworkBuilder;
use crate::errors::NetError;
use crate::tensor::Tensor;

fn context_with_labels(labels: &[f32]) -> TransformContext {
    let mut ctx = TransformContext::new(0.1, 1, 0.001, 10);
    ctx.labels = labels.to_vec();
    ctx
}

/// 前向把softmax输出写成`(长度, 1)`张量，并报告标量损失
#[test]
fn test_forward_exposes_softmax_and_cost() {
    let dnn = DeepNeuralNetworkBuilder::new()
        .layer_config(&[4, 2])
        .seed(7)
        .build()
        .unwrap();
    let mut fc = FullyConnectTransformer::new(dnn);
    let ctx = context_with_labels(&[1.0, 0.0]);

    let input = Tensor::new_random_seeded(97, 0.0, 1.0, 2, 2, 1, 1);
    fc.transform(&input, &ctx).unwrap();

    let output = fc.output().unwrap();
    assert_eq!(output.width(), 2);
    assert_eq!(output.height(), 1);
    assert_eq!(output.num(), 1);
    assert_eq!(output.dimension(), 1);

    // softmax输出构成概率分布
    let sum: f32 = output.flatten().iter().sum();
    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
    assert!(fc.cost().is_finite());
    assert!(fc.cost() >= 0.0);
}

/// 反向把内部网络输入层（不含偏置）的误差按展平的逆序还原成与输入同形的张量
#[test]
fn test_backward_unflattens_input_errors() {
    let dnn = DeepNeuralNetworkBuilder::new()
        .layer_config(&[4, 2])
        .seed(13)
        .build()
        .unwrap();
    let mut fc = FullyConnectTransformer::new(dnn);
    let ctx = context_with_labels(&[0.0, 1.0]);

    let input = Tensor::from_flat(&[0.1, 0.4, 0.7, 0.2], 2, 2, 1, 1).unwrap();
    fc.transform(&input, &ctx).unwrap();
    fc.back_propagate(None, &ctx).unwrap();

    let error = fc.error().unwrap();
    assert_eq!(error.width(), 2);
    assert_eq!(error.height(), 2);
    assert_eq!(error.num(), 1);
    assert_eq!(error.dimension(), 1);
    assert_eq!(error.flatten(), fc.network().input_errors());
}

/// 反向把上下文里的学习率同步给内部网络
#[test]
fn test_backward_syncs_alpha_from_context() {
    let dnn = DeepNeuralNetworkBuilder::new()
        .layer_config(&[4, 2])
        .alpha(0.5)
        .build()
        .unwrap();
    let mut fc = FullyConnectTransformer::new(dnn);
    let ctx = context_with_labels(&[1.0, 0.0]);

    let input = Tensor::new_random_seeded(103, 0.0, 1.0, 2, 2, 1, 1);
    fc.transform(&input, &ctx).unwrap();
    fc.back_propagate(None, &ctx).unwrap();

    assert_abs_diff_eq!(fc.network().alpha(), ctx.alpha());
}

#[test]
fn test_rejects_wrong_flatten_length() {
    let dnn = DeepNeuralNetworkBuilder::new()
        .layer_config(&[5, 2])
        .build()
        .unwrap();
    let mut fc = FullyConnectTransformer::new(dnn);
    let ctx = context_with_labels(&[1.0, 0.0]);

    let input = Tensor::new(2, 2, 1, 1);
    let result = fc.transform(&input, &ctx);
    assert!(matches!(result, Err(NetError::ShapeMismatch { .. })));
}

#[test]
fn test_backward_requires_forward_first() {
    let dnn = DeepNeuralNetworkBuilder::new()
        .layer_config(&[4, 2])
        .build()
        .unwrap();
    let mut fc = FullyConnectTransformer::new(dnn);
    let ctx = context_with_labels(&[1.0, 0.0]);

    let result = fc.back_propagate(None, &ctx);
    assert!(matches!(result, Err(NetError::Computation(_))));
}
