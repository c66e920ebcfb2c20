//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::{defaults, scoring};
use crate::core::{ChannelAxis, CorrelationMethod};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[derive(Parser, Debug)]
#[command(name = "das-coupling")]
#[command(about = "DAS通道耦合质量分析 / DAS channel coupling quality analysis")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 邻道相关性评分并标记坏道
    /// Score channels against their neighbours and flag bad ones
    Score(AppConfig),

    /// 在频谱矩阵的行区间内定位峰值
    /// Locate spectral peaks within a row sub-range
    Peak(PeakConfig),
}

/// 评分模式配置
#[derive(Args, Debug, Clone)]
pub struct AppConfig {
    /// 矩阵文件或目录路径 (CSV/TSV/TXT/JSON)
    /// Matrix file or directory
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// 邻道窗口宽度（>= 2）
    #[arg(short, long, default_value_t = scoring::DEFAULT_WINDOW_WIDTH)]
    pub window: usize,

    /// 相关方法: pearson | spearman
    #[arg(short, long, default_value = "pearson")]
    pub method: CorrelationMethod,

    /// 坏道阈值（质量严格低于该值即为坏道）
    #[arg(short, long, default_value_t = scoring::DEFAULT_BAD_THRESHOLD, allow_negative_numbers = true)]
    pub threshold: f64,

    /// 输入中通道所在的轴: columns | rows
    #[arg(long, default_value = "columns")]
    pub channel_axis: ChannelAxis,

    /// 通道级并行线程数（1 = 串行）
    #[arg(short = 'j', long, default_value_t = defaults::PARALLEL_THREADS)]
    pub threads: usize,

    /// 质量直方图bin数
    #[arg(long, default_value_t = scoring::DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,

    /// 输出JSON报告到文件
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// 显示详细处理信息
    #[arg(short, long)]
    pub verbose: bool,
}

impl AppConfig {
    /// 智能判断是否为批量模式（基于路径类型）
    #[inline]
    pub fn is_batch_mode(&self) -> bool {
        self.input_path.is_dir()
    }
}

/// 峰值定位配置
#[derive(Args, Debug, Clone)]
pub struct PeakConfig {
    /// 频谱矩阵文件 (CSV/TSV/TXT/JSON)，行 = 通道，列 = 频率
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// 行索引（省略时处理所有行）
    #[arg(short, long)]
    pub row: Option<usize>,

    /// 起始列（含）
    #[arg(long, conflicts_with = "freq_axis")]
    pub start: Option<usize>,

    /// 结束列（不含）
    #[arg(long, conflicts_with = "freq_axis")]
    pub end: Option<usize>,

    /// 频率轴文件（升序，与列一一对应）
    #[arg(long, value_name = "FILE", requires_all = ["fmin", "fmax"])]
    pub freq_axis: Option<PathBuf>,

    /// 频段下限（与 --freq-axis 一起使用）
    #[arg(long, allow_negative_numbers = true)]
    pub fmin: Option<f64>,

    /// 频段上限（与 --freq-axis 一起使用）
    #[arg(long, allow_negative_numbers = true)]
    pub fmax: Option<f64>,

    /// 显示详细处理信息
    #[arg(short, long)]
    pub verbose: bool,
}

/// 解析命令行参数
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// 显示程序启动信息
pub fn show_startup_info(verbose: bool) {
    println!("🚀 DAS Coupling Tool v{VERSION} 启动");
    println!("📝 {DESCRIPTION}");
    if verbose {
        println!("🔍 详细模式 / Verbose mode");
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(verbose: bool) {
    if verbose {
        println!("✅ 所有任务处理完成！");
    }
}
