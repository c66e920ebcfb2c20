//! 处理流程模块
//!
//! 串联 加载 → 评分 → 标记坏道 → 输出 的完整流程，以及峰值定位流程。

use super::cli::{AppConfig, PeakConfig};
use super::constants::defaults;
use super::formatter::{self, BatchEntry, ScoreReport};
use super::loader;
use super::scanner;
use super::utils;
use crate::core::{
    ChannelMatrix, CorrelationMethod, CouplingScores, NeighborCorrelationScorer,
    QualityHistogram, SummaryStats, nearest_index, peak_index,
};
use crate::error::{CouplingError, CouplingResult, ErrorCategory, invalid_parameter, shape_mismatch};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 单个矩阵文件的分析结果
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub path: PathBuf,
    pub scores: CouplingScores,
    pub bad_channels: Vec<usize>,
    /// 没有可评分通道时为 `None`
    pub summary: Option<SummaryStats>,
    pub histogram: QualityHistogram,
}

/// 单行峰值定位结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakHit {
    pub row: usize,
    pub column: usize,
    /// 提供频率轴时对应的轴值
    pub axis_value: Option<f64>,
}

/// 对内存中的通道矩阵评分
///
/// 可评分通道较少或并发度为1时串行；线程池创建失败时回退串行。
pub fn score_matrix(
    matrix: ChannelMatrix,
    config: &AppConfig,
) -> CouplingResult<AnalysisOutcome> {
    if !config.threshold.is_finite() {
        return Err(invalid_parameter("阈值必须是有限数", config.threshold));
    }

    if config.method == CorrelationMethod::Pearson && matrix.has_nan() {
        tracing::warn!("矩阵含NaN，Pearson会将相关通道对计为退化；可改用 --method spearman");
    }

    let mut scorer = NeighborCorrelationScorer::new(matrix, config.window)?;
    let usable = scorer.usable_channels();
    let degree = utils::effective_parallel_degree(config.threads, Some(usable));

    let scores = if degree > 1 && usable >= defaults::MIN_CHANNELS_FOR_PARALLEL {
        tracing::debug!(degree, usable, "通道级并行评分");
        match scorer.score_parallel(config.method, degree) {
            Err(CouplingError::ResourceError(e)) => {
                eprintln!("[WARNING] 并行评分失败 / Parallel scoring failed: {e}，回退到串行模式 / fallback to serial");
                scorer.score(config.method)?
            }
            other => other?,
        }
    } else {
        scorer.score(config.method)?
    };

    let bad_channels = scorer.find_bad(config.threshold)?;
    let summary = scorer.summary_stats().ok();
    let histogram = scores.histogram(config.bins);

    Ok(AnalysisOutcome {
        path: config.input_path.clone(),
        scores,
        bad_channels,
        summary,
        histogram,
    })
}

/// 加载并评分单个矩阵文件
pub fn process_matrix_file(path: &Path, config: &AppConfig) -> CouplingResult<AnalysisOutcome> {
    let matrix = loader::load_channel_matrix(path, config.channel_axis)?;
    if config.verbose {
        println!(
            "[INFO] 已加载 / Loaded {}: {} 样本 × {} 通道",
            utils::extract_filename_lossy(path),
            matrix.sample_count(),
            matrix.channel_count()
        );
    }

    let mut outcome = score_matrix(matrix, config)?;
    outcome.path = path.to_path_buf();
    Ok(outcome)
}

/// 输出单文件结果：终端表格 + 可选JSON报告
pub fn output_results(outcome: &AnalysisOutcome, config: &AppConfig) -> CouplingResult<()> {
    print!("{}", formatter::format_score_report(outcome, config));

    if let Some(path) = &config.output_path {
        formatter::write_json(path, &ScoreReport::from_outcome(outcome, config))?;
        println!("💾 JSON报告已保存 / Report saved: {}", path.display());
    }
    Ok(())
}

/// 批量评分目录中的所有矩阵文件
///
/// 单个文件失败不影响其余文件，失败按错误类别统计。
/// 所有文件都失败时返回第一个错误。
pub fn process_batch(config: &AppConfig) -> CouplingResult<Vec<AnalysisOutcome>> {
    let files = scanner::scan_matrix_files(&config.input_path)?;
    scanner::show_scan_results(config, &files);

    let mut outcomes = Vec::new();
    let mut entries = Vec::with_capacity(files.len());
    let mut error_stats: HashMap<ErrorCategory, Vec<String>> = HashMap::new();
    let mut first_error = None;

    for (index, file) in files.iter().enumerate() {
        let filename = utils::extract_filename_lossy(file);
        if config.verbose {
            println!(
                "[PROCESSING] [{}/{}] 处理 / Processing: {filename}",
                index + 1,
                files.len()
            );
        }

        match process_matrix_file(file, config) {
            Ok(outcome) => {
                entries.push(BatchEntry {
                    file: filename,
                    scored: outcome.scores.quality().len(),
                    global_median: outcome.scores.global_median(),
                    bad_channels: outcome.bad_channels.len(),
                    error: None,
                });
                outcomes.push(outcome);
            }
            Err(e) => {
                eprintln!("[WARNING] {filename}: {e}");
                entries.push(BatchEntry {
                    file: filename.clone(),
                    scored: 0,
                    global_median: None,
                    bad_channels: 0,
                    error: Some(e.to_string()),
                });
                error_stats
                    .entry(ErrorCategory::from_coupling_error(&e))
                    .or_default()
                    .push(filename);
                first_error.get_or_insert(e);
            }
        }
    }

    if files.is_empty() {
        return Ok(outcomes);
    }

    print!("{}", formatter::format_batch_summary(&entries));
    for (category, names) in &error_stats {
        println!(
            "   {} ({}): {}",
            category.display_name(),
            names.len(),
            names.join(", ")
        );
    }

    if outcomes.is_empty()
        && let Some(e) = first_error
    {
        return Err(e);
    }

    if let Some(path) = &config.output_path {
        let reports: Vec<ScoreReport> = outcomes
            .iter()
            .map(|o| ScoreReport::from_outcome(o, config))
            .collect();
        formatter::write_json(path, &reports)?;
        println!("💾 JSON报告已保存 / Report saved: {}", path.display());
    }

    Ok(outcomes)
}

/// 根据配置确定列区间 `[start, end)` 及可选的频率轴
fn resolve_column_range(
    config: &PeakConfig,
    columns: usize,
) -> CouplingResult<(usize, usize, Option<Vec<f64>>)> {
    let Some(axis_path) = &config.freq_axis else {
        let start = config.start.unwrap_or(0);
        let end = config.end.unwrap_or(columns);
        return Ok((start, end, None));
    };

    let axis = loader::load_axis(axis_path)?;
    if axis.len() != columns {
        return Err(shape_mismatch(
            "频率轴长度与频谱列数不一致",
            format!("{} != {columns}", axis.len()),
        ));
    }

    let (fmin, fmax) = match (config.fmin, config.fmax) {
        (Some(lo), Some(hi)) if lo <= hi => (lo, hi),
        (Some(lo), Some(hi)) => {
            return Err(invalid_parameter("频段下限大于上限", format!("{lo} > {hi}")));
        }
        _ => {
            return Err(CouplingError::InvalidParameter(
                "--freq-axis 需要同时指定 --fmin 和 --fmax".to_string(),
            ));
        }
    };

    // 上限所在列包含在区间内
    let start = nearest_index(&axis, fmin)?;
    let end = nearest_index(&axis, fmax)? + 1;
    Ok((start, end, Some(axis)))
}

/// 峰值定位流程
pub fn locate_peaks(config: &PeakConfig) -> CouplingResult<Vec<PeakHit>> {
    let spectrum = loader::load_array(&config.input_path)?;
    let (rows, columns) = spectrum.dim();
    let (start, end, axis) = resolve_column_range(config, columns)?;

    if config.verbose {
        println!(
            "[INFO] 频谱 / Spectrum {rows} × {columns}，列区间 / columns {start}..{end}"
        );
    }

    let targets: Vec<usize> = match config.row {
        Some(row) => vec![row],
        None => (0..rows).collect(),
    };

    targets
        .into_iter()
        .map(|row| -> CouplingResult<PeakHit> {
            let column = peak_index(spectrum.view(), row, start, end)?;
            Ok(PeakHit {
                row,
                column,
                axis_value: axis.as_ref().map(|a| a[column]),
            })
        })
        .collect()
}
