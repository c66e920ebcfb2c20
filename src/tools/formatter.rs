//! 输出格式化模块
//!
//! 负责评分结果和峰值定位结果的表格输出，以及JSON报告序列化。

use super::cli::AppConfig;
use super::processor::{AnalysisOutcome, PeakHit};
use super::utils;
use crate::core::{ChannelAxis, CorrelationMethod, HistogramBin, SummaryStats};
use crate::error::CouplingResult;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 分隔线
const SEPARATOR: &str =
    "--------------------------------------------------------------------------------\n";

/// 单文件JSON报告
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub tool_version: String,
    pub generated_at: String,
    pub input: PathBuf,
    pub method: CorrelationMethod,
    pub window: usize,
    pub threshold: f64,
    pub channel_axis: ChannelAxis,
    pub channel_count: usize,
    pub quality: Vec<f64>,
    pub global_median: Option<f64>,
    pub summary: Option<SummaryStats>,
    pub bad_channels: Vec<usize>,
    pub unscored_tail: Range<usize>,
    pub degenerate_pairs: usize,
    pub histogram: Vec<HistogramBin>,
    /// 计数最多的bin
    pub histogram_mode: Option<HistogramBin>,
    /// 未计入直方图的非有限分数个数
    pub histogram_skipped: usize,
}

impl ScoreReport {
    pub fn from_outcome(outcome: &AnalysisOutcome, config: &AppConfig) -> Self {
        let scores = &outcome.scores;
        Self {
            tool_version: VERSION.to_string(),
            generated_at: chrono::Local::now().to_rfc3339(),
            input: outcome.path.clone(),
            method: scores.method(),
            window: scores.window(),
            threshold: config.threshold,
            channel_axis: config.channel_axis,
            channel_count: scores.channel_count(),
            quality: scores.quality().to_vec(),
            global_median: scores.global_median(),
            summary: outcome.summary,
            bad_channels: outcome.bad_channels.clone(),
            unscored_tail: scores.unscored_tail(),
            degenerate_pairs: scores.degenerate_pairs(),
            histogram: outcome.histogram.bins().to_vec(),
            histogram_mode: outcome.histogram.mode_bin().cloned(),
            histogram_skipped: outcome.histogram.skipped(),
        }
    }
}

/// 将可序列化对象写为格式化JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CouplingResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 创建输出头部信息
pub fn create_output_header(source: &Path) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "DAS Coupling Tool v{VERSION} / Channel Coupling Quality Report\n"
    ));
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    output.push_str(&format!("log date: {now}\n"));
    output.push_str(&format!(
        "source: {}\n\n",
        utils::extract_filename_lossy(source)
    ));
    output.push_str(SEPARATOR);
    output
}

/// 格式化质量分数（无值时显示占位符）
fn fmt_score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

/// 直方图区间标签，最后一个bin包含上界
fn bin_label(bin: &HistogramBin, is_last: bool) -> String {
    let close = if is_last { ']' } else { ')' };
    format!("[{:+.2}, {:+.2}{close}", bin.lower, bin.upper)
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text.to_string()).set_alignment(CellAlignment::Right)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// 格式化单文件评分报告
///
/// 非verbose时每通道表只列出坏道，避免数千行输出。
pub fn format_score_report(outcome: &AnalysisOutcome, config: &AppConfig) -> String {
    let scores = &outcome.scores;
    let mut output = create_output_header(&outcome.path);

    let tail = scores.unscored_tail();
    output.push_str(&format!(
        "Method: {}  Window: {}  Threshold: {}\n",
        scores.method(),
        scores.window(),
        config.threshold
    ));
    output.push_str(&format!(
        "Channels: {}  Scored: {}  Unscored tail: {}..{}\n",
        scores.channel_count(),
        scores.quality().len(),
        tail.start,
        tail.end
    ));
    if scores.degenerate_pairs() > 0 {
        output.push_str(&format!(
            "[WARNING] 退化通道对 / degenerate pairs scored as 0.0: {}\n",
            scores.degenerate_pairs()
        ));
    }
    output.push('\n');

    // 汇总
    let mut summary = new_table(vec!["Metric / 指标", "Value / 数值"]);
    summary.add_row(vec![
        Cell::new("Mean / 平均值"),
        right(fmt_score(outcome.summary.map(|s| s.mean))),
    ]);
    summary.add_row(vec![
        Cell::new("Median / 中位数"),
        right(fmt_score(scores.global_median())),
    ]);
    summary.add_row(vec![
        Cell::new("Bad channels / 坏道数"),
        right(outcome.bad_channels.len()),
    ]);
    let histogram_data = &outcome.histogram;
    let last_bin = histogram_data.bins().len().saturating_sub(1);
    let mode = histogram_data.mode_bin().map_or_else(
        || "-".to_string(),
        |bin| {
            let is_last = histogram_data
                .bins()
                .last()
                .is_some_and(|last| std::ptr::eq(last, bin));
            format!("{} × {}", bin_label(bin, is_last), bin.count)
        },
    );
    summary.add_row(vec![Cell::new("Mode bin / 众数区间"), right(mode)]);
    if histogram_data.skipped() > 0 {
        summary.add_row(vec![
            Cell::new("Non-finite / 非有限值"),
            right(histogram_data.skipped()),
        ]);
    }
    output.push_str(&format!("{summary}\n\n"));

    // 分布
    let mut histogram = new_table(vec!["Range / 区间", "Count / 数量", ""]);
    let max_count = outcome
        .histogram
        .bins()
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    for (index, bin) in outcome.histogram.bins().iter().enumerate() {
        let bar_len = if max_count == 0 {
            0
        } else {
            (bin.count * 30).div_ceil(max_count)
        };
        histogram.add_row(vec![
            Cell::new(bin_label(bin, index == last_bin)),
            right(bin.count),
            Cell::new("█".repeat(bar_len)),
        ]);
    }
    output.push_str(&format!("{histogram}\n\n"));

    // 通道明细
    // verbose时附带每个通道与各邻道的相关系数
    let mut header = vec!["Channel / 通道", "Quality / 质量", "Flag / 标记"];
    if config.verbose {
        header.push("Neighbours / 邻道系数");
    }
    let mut channels = new_table(header);
    let mut listed = 0;
    for (channel, &quality) in scores.quality().iter().enumerate() {
        let is_bad = outcome.bad_channels.binary_search(&channel).is_ok();
        if !config.verbose && !is_bad {
            continue;
        }
        let mut row = vec![
            right(channel),
            right(format!("{quality:.4}")),
            Cell::new(if is_bad { "BAD" } else { "" }),
        ];
        if config.verbose {
            let neighbours = scores.neighbor_scores(channel).map_or_else(String::new, |r| {
                r.iter()
                    .map(|v| format!("{v:+.3}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            });
            row.push(Cell::new(neighbours));
        }
        channels.add_row(row);
        listed += 1;
    }
    if listed > 0 {
        output.push_str(&format!("{channels}\n"));
    } else {
        output.push_str("✅ 没有坏道 / No bad channels\n");
    }

    output.push_str(SEPARATOR);
    output
}

/// 批量模式汇总中的单条记录
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub file: String,
    pub scored: usize,
    pub global_median: Option<f64>,
    pub bad_channels: usize,
    pub error: Option<String>,
}

/// 格式化批量汇总表
pub fn format_batch_summary(entries: &[BatchEntry]) -> String {
    let mut table = new_table(vec![
        "File / 文件",
        "Scored / 已评分",
        "Median / 中位数",
        "Bad / 坏道",
        "Status / 状态",
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.file),
            right(entry.scored),
            right(fmt_score(entry.global_median)),
            right(entry.bad_channels),
            Cell::new(entry.error.as_deref().unwrap_or("OK")),
        ]);
    }

    format!("{table}\n")
}

/// 格式化峰值定位结果
pub fn format_peak_report(source: &Path, hits: &[PeakHit]) -> String {
    let mut output = create_output_header(source);
    let mut table = new_table(vec!["Row / 行", "Peak column / 峰值列", "Axis value / 轴值"]);

    for hit in hits {
        table.add_row(vec![
            right(hit.row),
            right(hit.column),
            right(hit.axis_value.map_or_else(|| "-".to_string(), |f| format!("{f:.3}"))),
        ]);
    }

    output.push_str(&format!("{table}\n"));
    output
}
