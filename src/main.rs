//! DAS Coupling Tool - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成耦合质量分析任务。

use das_coupling_tool::{
    error::{CouplingError, ErrorCategory},
    tools::{self, AppConfig, Commands, PeakConfig},
};
use std::process;
use tracing_subscriber::EnvFilter;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 参数错误
    pub const PARAMETER_ERROR: i32 = 2;
    /// 数据错误（格式、形状、定义域）
    pub const DATA_ERROR: i32 = 3;
    /// 资源/并发错误
    pub const RESOURCE_ERROR: i32 = 5;
}

/// 初始化诊断日志：verbose时为debug，否则只输出warn；RUST_LOG优先
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 获取错误建议文本
fn get_error_suggestion(error: &CouplingError) -> &'static str {
    match error {
        CouplingError::InvalidParameter(_) => {
            "检查窗口宽度（2 <= window <= 通道数）和阈值，使用 --help 查看完整用法 / Check window (2 <= window <= channels) and threshold, use --help for usage"
        }
        CouplingError::DomainError(_) => {
            "频谱区间内存在非正值，log10 无定义；请检查列区间或输入数据 / Non-positive values in the spectral range, log10 is undefined"
        }
        CouplingError::ShapeMismatch(_) => {
            "检查矩阵是否为规则的矩形以及行列索引是否越界 / Check that the matrix is rectangular and indices are in range"
        }
        CouplingError::ResourceError(_) => {
            "资源不可用，请降低并发度（-j 1） / Resource unavailable, reduce parallelism (-j 1)"
        }
        _ => match ErrorCategory::from_coupling_error(error) {
            ErrorCategory::Io => {
                "检查文件路径是否正确，文件是否存在且可读 / Check if file path is correct, file exists and is readable"
            }
            ErrorCategory::Data => {
                "确保输入文件为支持的格式 (CSV/TSV/TXT/JSON) / Ensure input file is in a supported format"
            }
            _ => "请检查输入文件和参数设置 / Please check input file and parameter settings",
        },
    }
}

/// 错误处理和建议
fn handle_error(error: CouplingError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));

    let exit_code = match ErrorCategory::from_coupling_error(&error) {
        ErrorCategory::Parameter | ErrorCategory::CallOrder => exit_codes::PARAMETER_ERROR,
        ErrorCategory::Data => exit_codes::DATA_ERROR,
        ErrorCategory::Io => exit_codes::GENERAL_ERROR,
        ErrorCategory::Other => exit_codes::RESOURCE_ERROR,
    };

    process::exit(exit_code);
}

/// 评分模式：单文件或目录批量
fn run_score(config: &AppConfig) -> Result<(), CouplingError> {
    if config.is_batch_mode() {
        tools::process_batch(config)?;
    } else {
        let outcome = tools::process_matrix_file(&config.input_path, config)?;
        tools::output_results(&outcome, config)?;
    }
    Ok(())
}

/// 峰值定位模式
fn run_peak(config: &PeakConfig) -> Result<(), CouplingError> {
    let hits = tools::locate_peaks(config)?;
    print!("{}", tools::format_peak_report(&config.input_path, &hits));
    Ok(())
}

fn main() {
    let cli = tools::parse_args();

    let verbose = match &cli.command {
        Commands::Score(config) => config.verbose,
        Commands::Peak(config) => config.verbose,
    };
    init_tracing(verbose);
    tools::show_startup_info(verbose);

    let result = match &cli.command {
        Commands::Score(config) => run_score(config),
        Commands::Peak(config) => run_peak(config),
    };

    if let Err(error) = result {
        handle_error(error);
    }

    tools::show_completion_info(verbose);
}
