//! 矩阵文件加载模块
//!
//! 将预处理流水线导出的数值矩阵读入内存。支持的格式：
//! - CSV（`.csv`，逗号分隔）和 TSV（`.tsv`，制表符分隔）：每行一个样本，
//!   `#` 开头的注释行和空行被跳过，行长度不一致视为形状错误
//! - 纯文本（`.txt`）：空白分隔，同样跳过 `#` 注释行
//! - JSON：二维数组 `[[...], ...]`，`null` 表示缺失值
//!
//! 数值中的 `nan` 表示缺失值。

use super::constants::formats::{
    CSV_EXTENSIONS, JSON_EXTENSIONS, TEXT_EXTENSIONS, TSV_EXTENSIONS,
};
use super::utils;
use crate::core::channel_matrix::rows_to_array;
use crate::core::{ChannelAxis, ChannelMatrix};
use crate::error::{CouplingError, CouplingResult, format_error};
use csv::{ErrorKind, ReaderBuilder, Trim};
use ndarray::Array2;
use std::path::Path;

/// 识别出的矩阵文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Csv,
    Tsv,
    Text,
    Json,
}

impl MatrixFormat {
    /// 根据扩展名识别格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = utils::extract_extension_lowercase(path);
        let ext = ext.as_str();
        if CSV_EXTENSIONS.contains(&ext) {
            Some(Self::Csv)
        } else if TSV_EXTENSIONS.contains(&ext) {
            Some(Self::Tsv)
        } else if TEXT_EXTENSIONS.contains(&ext) {
            Some(Self::Text)
        } else if JSON_EXTENSIONS.contains(&ext) {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// 按格式解析为逐行数据
    fn parse_rows(self, text: &str) -> CouplingResult<Vec<Vec<f64>>> {
        match self {
            Self::Csv => parse_separated(text, b','),
            Self::Tsv => parse_separated(text, b'\t'),
            Self::Text => parse_whitespace(text),
            Self::Json => parse_json_rows(text),
        }
    }
}

/// 检查文件扩展名是否为支持的矩阵格式
#[inline]
pub fn is_supported_matrix_file(path: &Path) -> bool {
    MatrixFormat::from_path(path).is_some()
}

fn detect_format(path: &Path) -> CouplingResult<MatrixFormat> {
    MatrixFormat::from_path(path).ok_or_else(|| {
        CouplingError::FormatError(format!(
            "不支持的文件格式 / unsupported file format: {}",
            path.display()
        ))
    })
}

/// 读取通道矩阵
pub fn load_channel_matrix(path: &Path, axis: ChannelAxis) -> CouplingResult<ChannelMatrix> {
    let array = load_array(path)?;
    if array.is_empty() {
        return Err(CouplingError::InvalidParameter(format!(
            "矩阵为空 / empty matrix: {}",
            path.display()
        )));
    }
    Ok(ChannelMatrix::from_array(array, axis))
}

/// 读取任意二维数值数组（行列按文件原样）
pub fn load_array(path: &Path) -> CouplingResult<Array2<f64>> {
    let format = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    rows_to_array(format.parse_rows(&text)?)
}

/// 读取一维数值序列（例如频率轴），按阅读顺序展开所有值
pub fn load_axis(path: &Path) -> CouplingResult<Vec<f64>> {
    let format = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    let values = match format {
        MatrixFormat::Json => {
            let raw: Vec<Option<f64>> = serde_json::from_str(&text)?;
            raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
        }
        other => other.parse_rows(&text)?.into_iter().flatten().collect(),
    };
    Ok(values)
}

fn parse_value(token: &str, line: u64, column: usize) -> CouplingResult<f64> {
    token
        .parse::<f64>()
        .map_err(|e| format_error(&format!("第{line}行第{column}列无法解析 '{token}'"), e))
}

/// csv错误映射：行长度不一致为形状错误，底层I/O保持I/O错误
fn map_csv_error(err: csv::Error) -> CouplingError {
    let message = err.to_string();
    match err.into_kind() {
        ErrorKind::UnequalLengths { .. } => CouplingError::ShapeMismatch(message),
        ErrorKind::Io(e) => CouplingError::IoError(e),
        _ => CouplingError::FormatError(message),
    }
}

/// 使用csv读取器解析单字符分隔的文本（CSV/TSV）
pub fn parse_separated(text: &str, delimiter: u8) -> CouplingResult<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(map_csv_error)?;
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .iter()
            .enumerate()
            .map(|(col, token)| parse_value(token, line, col + 1))
            .collect::<CouplingResult<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

/// 解析空白分隔的纯文本
pub fn parse_whitespace(text: &str) -> CouplingResult<Vec<Vec<f64>>> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split_whitespace()
            .enumerate()
            .map(|(col, token)| parse_value(token, line_no as u64 + 1, col + 1))
            .collect::<CouplingResult<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

/// 解析JSON二维数组，`null` 映射为NaN
pub fn parse_json_rows(text: &str) -> CouplingResult<Vec<Vec<f64>>> {
    let raw: Vec<Vec<Option<f64>>> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}
