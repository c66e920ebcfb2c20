//! 工具模块集合
//!
//! 包含CLI、文件加载、扫描、格式化等工具模块，支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod loader;
pub mod processor;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, Cli, Commands, PeakConfig, parse_args, show_completion_info, show_startup_info};
pub use formatter::{ScoreReport, format_batch_summary, format_peak_report, format_score_report};
pub use loader::{load_array, load_axis, load_channel_matrix};
pub use processor::{
    AnalysisOutcome, PeakHit, locate_peaks, output_results, process_batch, process_matrix_file,
    score_matrix,
};
pub use scanner::{scan_matrix_files, show_scan_results};
