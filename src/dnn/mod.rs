/*
 * @Author       : 老董
 * @Date         : 2025-11-09 09:35:47
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03 21:18:56
 * @Description  : 深度神经网络（多层感知机）引擎：
 *                 神经元+突触构成的分层全连接图，前向逐层计算，
 *                 softmax打分后按批累积误差，批界处沿突触手动反向传播并更新权重。
 */

mod builder;
mod network;
mod neuron;

pub use builder::DeepNeuralNetworkBuilder;
pub use network::DeepNeuralNetwork;

#[cfg(test)]
mod tests;
