//! 工具函数模块
//!
//! 提供并发度计算、文件路径处理等通用工具函数。

use super::constants::parallel_limits::{MAX_PARALLEL_DEGREE, MIN_PARALLEL_DEGREE};

/// 计算实际并发度
///
/// 将请求值钳制到 `[MIN_PARALLEL_DEGREE, MAX_PARALLEL_DEGREE]`，
/// 并且不超过工作项数量（若已知）。
pub fn effective_parallel_degree(requested: usize, work_items: Option<usize>) -> usize {
    let degree = requested.clamp(MIN_PARALLEL_DEGREE, MAX_PARALLEL_DEGREE);
    match work_items {
        Some(n) => degree.min(n.max(MIN_PARALLEL_DEGREE)),
        None => degree,
    }
}

/// 文件路径处理工具函数
pub mod path {
    use std::path::Path;

    /// 提取文件名（返回String，用于日志显示）
    #[inline]
    pub fn extract_filename_lossy(path: &Path) -> String {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 提取小写扩展名（用于格式识别）
    #[inline]
    pub fn extract_extension_lowercase(path: &Path) -> String {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default()
    }
}

// 重新导出为平级函数
pub use path::{extract_extension_lowercase, extract_filename_lossy};
