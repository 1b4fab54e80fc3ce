use approx::assert_abs_diff_eq;

use super::context;
use crate::cnn::{ConvolutionalTransformer, TraitTransformer};
use crate::errors::NetError;
use crate::functions::{Identity, Relu};
use crate::tensor::Tensor;

#[test]
fn test_rejects_zero_stride() {
    let kernel = Tensor::new(3, 3, 1, 1);
    let result = ConvolutionalTransformer::new(kernel, Relu::default().into(), 0);
    assert!(matches!(result, Err(NetError::Configuration(_))));
}

/// 输出空间尺寸 =（输入尺寸 − 核尺寸 + 1）/ 步幅，通道样本数 = 核数
#[test]
fn test_output_shape() {
    let kernel = Tensor::new(3, 3, 2, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Relu::default().into(), 1).unwrap();
    let input = Tensor::new_random_seeded(83, 0.0, 1.0, 6, 6, 1, 1);
    conv.transform(&input, &context()).unwrap();

    let output = conv.output().unwrap();
    assert_eq!(output.width(), 4);
    assert_eq!(output.height(), 4);
    assert_eq!(output.num(), 2);
    assert_eq!(output.dimension(), 1);
}

#[test]
fn test_output_shape_with_stride() {
    let kernel = Tensor::new(3, 3, 1, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Relu::default().into(), 2).unwrap();
    let input = Tensor::new_random_seeded(89, 0.0, 1.0, 7, 7, 1, 1);
    conv.transform(&input, &context()).unwrap();

    // (7 - 3 + 1) / 2 = 2
    let output = conv.output().unwrap();
    assert_eq!(output.width(), 2);
    assert_eq!(output.height(), 2);
}

#[test]
fn test_rejects_channel_mismatch() {
    let kernel = Tensor::new(3, 3, 1, 2);
    let mut conv = ConvolutionalTransformer::new(kernel, Relu::default().into(), 1).unwrap();
    let input = Tensor::new(6, 6, 1, 1);

    let result = conv.transform(&input, &context());
    assert_eq!(
        result,
        Err(NetError::ShapeMismatch {
            expected: vec![2],
            got: vec![1],
            message: "卷积核维度与输入数据维度不符".to_string(),
        })
    );
}

#[test]
fn test_rejects_kernel_larger_than_input() {
    let kernel = Tensor::new(5, 5, 1, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Relu::default().into(), 1).unwrap();
    let input = Tensor::new(4, 4, 1, 1);

    let result = conv.transform(&input, &context());
    assert!(matches!(result, Err(NetError::ShapeMismatch { .. })));
}

/// 核不大于输入、步幅也合法，但步幅大到输出尺寸算出来为0：
/// (3 − 3 + 1) / 2 = 0，须报形状不匹配而非panic
#[test]
fn test_rejects_zero_output_extent() {
    let kernel = Tensor::new(3, 3, 1, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Relu::default().into(), 2).unwrap();
    let input = Tensor::new(3, 3, 1, 1);

    let result = conv.transform(&input, &context());
    assert_eq!(
        result,
        Err(NetError::ShapeMismatch {
            expected: vec![1, 1],
            got: vec![0, 0],
            message: "步幅过大，卷积输出尺寸为0".to_string(),
        })
    );
}

/// 全1输入过全1核：每个输出位置都是感受野元素个数
#[test]
fn test_forward_sums_receptive_field() {
    let kernel = Tensor::from_flat(&[1.0; 4], 2, 2, 1, 1).unwrap();
    let mut conv = ConvolutionalTransformer::new(kernel, Identity.into(), 1).unwrap();
    let input = Tensor::from_flat(&[1.0; 9], 3, 3, 1, 1).unwrap();
    conv.transform(&input, &context()).unwrap();

    let output = conv.output().unwrap();
    assert_eq!(output.width(), 2);
    assert_eq!(output.height(), 2);
    for w in 0..2 {
        for h in 0..2 {
            assert_abs_diff_eq!(output[(0, 0, w, h)], 4.0);
        }
    }
}

/// 2×2输入配2×2核（输出1×1）：反向后
/// 核权重增量 = α × 局部误差 × 对应输入值，
/// 输入误差 = 局部误差 × 更新前的核权重。
#[test]
fn test_backward_matches_closed_form() {
    let ctx = context();
    let kernel_values = [0.5f32, -0.25, 0.75, 1.0];
    let input_values = [0.2f32, 0.4, 0.6, 0.8];
    let rear_value = 0.3f32;

    let kernel = Tensor::from_flat(&kernel_values, 2, 2, 1, 1).unwrap();
    let mut conv = ConvolutionalTransformer::new(kernel, Identity.into(), 1).unwrap();
    let input = Tensor::from_flat(&input_values, 2, 2, 1, 1).unwrap();
    conv.transform(&input, &ctx).unwrap();

    let mut rear = Tensor::new(1, 1, 1, 1);
    rear[(0, 0, 0, 0)] = rear_value;
    conv.back_propagate(Some(&rear), &ctx).unwrap();

    // 原样激活的导数为1，局部误差即后级误差
    let after = conv.kernel().flatten();
    for i in 0..4 {
        let expected = kernel_values[i] - ctx.alpha() * rear_value * input_values[i];
        assert_abs_diff_eq!(after[i], expected, epsilon = 1e-6);
    }

    let error = conv.error().unwrap();
    assert_eq!(error.len(), 4);
    for (i, &k) in kernel_values.iter().enumerate() {
        assert_abs_diff_eq!(error.flatten()[i], rear_value * k, epsilon = 1e-6);
    }
}

#[test]
fn test_backward_requires_forward_first() {
    let kernel = Tensor::new(2, 2, 1, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Identity.into(), 1).unwrap();
    let rear = Tensor::new(1, 1, 1, 1);

    let result = conv.back_propagate(Some(&rear), &context());
    assert!(matches!(result, Err(NetError::Computation(_))));
}

#[test]
fn test_backward_requires_rear_error() {
    let kernel = Tensor::new(2, 2, 1, 1);
    let mut conv = ConvolutionalTransformer::new(kernel, Identity.into(), 1).unwrap();
    let ctx = context();
    conv.transform(&Tensor::new(3, 3, 1, 1), &ctx).unwrap();

    let result = conv.back_propagate(None, &ctx);
    assert!(matches!(result, Err(NetError::Computation(_))));
}
