//! DAS Coupling Tool
//!
//! 分布式光纤声波传感（DAS）通道耦合质量分析工具。
//! 耦合不良的通道（安装缺陷、熔接点、噪声）与空间相邻通道的相关性明显偏低，
//! 通过邻道相关性评分将其标记出来，供下游处理剔除。
//!
//! ## 核心特性
//! - 邻道窗口相关性评分：Pearson / Spearman（成对忽略NaN）
//! - 中位数稳健聚合：每通道质量 = 邻道系数中位数，全局质量 = 通道质量中位数
//! - 严格阈值坏道标记
//! - 频谱峰值定位与有序序列最近值查找
//! - rayon通道级并行，结果与串行逐位一致

pub mod core;
pub mod error;
pub mod tools;

// 重新导出核心类型
pub use core::{
    ChannelAxis, ChannelMatrix, CorrelationMethod, CouplingScores, NeighborCorrelationScorer,
    QualityHistogram, SummaryStats, nearest_index, peak_index,
};
pub use error::{CouplingError, CouplingResult};
