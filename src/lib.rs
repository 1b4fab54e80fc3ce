//! # Naive Nets
//!
//! `naive_nets`项目旨在用纯rust手写一个不依赖自动微分框架的神经网络计算引擎：
//! 既包含经典的多层感知机（[DNN](crate::dnn)，神经元+突触构成的分层图），
//! 也包含卷积管线（[CNN](crate::cnn)，卷积→池化→全连接分类器的转换器链），
//! 梯度全部手动推导并沿可变的计算结构反向传播。
//!
//! 数据读取、图表渲染等皆为外部协作方，本crate只消费张量与one-hot标签，
//! 并以只读方式暴露输出与每轮代价列表。

pub mod cnn;
pub mod dnn;
pub mod errors;
pub mod functions;
pub mod tensor;
pub mod training;
