//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 邻道评分常量
pub mod scoring {
    /// 默认邻道窗口宽度（与核心评分器保持一致）
    pub use crate::core::scorer::DEFAULT_WINDOW_WIDTH;

    /// 默认坏道阈值
    ///
    /// 质量分数严格低于该值的通道被标记为坏道
    pub const DEFAULT_BAD_THRESHOLD: f64 = 0.5;

    /// 默认质量直方图bin数
    ///
    /// `[-1, 1]` 区间10等分，每个bin宽0.2
    pub const DEFAULT_HISTOGRAM_BINS: usize = 10;
}

/// 默认配置值
pub mod defaults {
    /// 默认通道级并行线程数
    ///
    /// 4线程在多数场景下提供良好的性能/资源平衡
    pub const PARALLEL_THREADS: usize = 4;

    /// 小于该可评分通道数时直接串行，避免线程池开销
    pub const MIN_CHANNELS_FOR_PARALLEL: usize = 64;
}

/// 并发度限制常量
pub mod parallel_limits {
    /// 最小并发度
    pub const MIN_PARALLEL_DEGREE: usize = 1;

    /// 最大并发度
    ///
    /// 限制最大并发度为16，避免过度并发导致的上下文切换开销
    pub const MAX_PARALLEL_DEGREE: usize = 16;
}

/// 支持的矩阵文件格式
pub mod formats {
    /// 逗号分隔格式扩展名
    pub const CSV_EXTENSIONS: &[&str] = &["csv"];

    /// 制表符分隔格式扩展名
    pub const TSV_EXTENSIONS: &[&str] = &["tsv"];

    /// 空白分隔纯文本扩展名
    pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

    /// JSON格式扩展名
    pub const JSON_EXTENSIONS: &[&str] = &["json"];
}
