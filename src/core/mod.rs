//! 核心算法模块
//!
//! 包含邻道相关性评分和数组特征定位的数据结构与算法实现。

pub mod channel_matrix;
pub mod correlation;
pub mod histogram;
pub mod locator;
pub mod scorer;
pub mod stats;

// 重新导出公共接口
pub use channel_matrix::{ChannelAxis, ChannelMatrix};
pub use correlation::CorrelationMethod;
pub use histogram::{HistogramBin, QualityHistogram};
pub use locator::{nearest_index, peak_index};
pub use scorer::{CouplingScores, NeighborCorrelationScorer, SummaryStats};
