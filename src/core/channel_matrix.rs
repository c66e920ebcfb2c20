//! 通道矩阵数据结构
//!
//! 统一约定：矩阵轴为 (样本, 通道)，即每一列是一个通道的时间序列。
//! 列索引对应光纤上的物理位置，相邻列即空间相邻通道。

use crate::error::{CouplingError, CouplingResult, shape_mismatch};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 输入数据中通道所在的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelAxis {
    /// 每列一个通道（行 = 时间样本）
    #[default]
    Columns,
    /// 每行一个通道（列 = 时间样本），构造时转置
    Rows,
}

impl FromStr for ChannelAxis {
    type Err = CouplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "columns" | "cols" | "col" => Ok(Self::Columns),
            "rows" | "row" => Ok(Self::Rows),
            other => Err(CouplingError::InvalidParameter(format!(
                "未知的通道轴 / unknown channel axis: {other} (columns|rows)"
            ))),
        }
    }
}

/// 不可变的通道×样本矩阵
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMatrix {
    /// 形状 (sample_count, channel_count)
    data: Array2<f64>,
}

impl ChannelMatrix {
    /// 从 (样本, 通道) 排列的数组创建
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// 按指定通道轴创建，`Rows` 时转置为标准布局
    pub fn from_array(data: Array2<f64>, axis: ChannelAxis) -> Self {
        match axis {
            ChannelAxis::Columns => Self::new(data),
            ChannelAxis::Rows => Self::new(data.t().as_standard_layout().into_owned()),
        }
    }

    /// 从逐行数据创建（每个内层Vec是一行）
    ///
    /// 行长度不一致时返回 `ShapeMismatch`。
    pub fn from_rows(rows: Vec<Vec<f64>>, axis: ChannelAxis) -> CouplingResult<Self> {
        let array = rows_to_array(rows)?;
        Ok(Self::from_array(array, axis))
    }

    /// 从逐通道序列创建（每个内层Vec是一个通道）
    pub fn from_channels(channels: Vec<Vec<f64>>) -> CouplingResult<Self> {
        Self::from_rows(channels, ChannelAxis::Rows)
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.data.nrows()
    }

    /// 获取单个通道的样本视图
    ///
    /// 越界时返回 `ShapeMismatch`。
    pub fn channel(&self, index: usize) -> CouplingResult<ArrayView1<'_, f64>> {
        if index >= self.channel_count() {
            return Err(shape_mismatch(
                "通道索引越界",
                format!("{index} >= {}", self.channel_count()),
            ));
        }
        Ok(self.data.column(index))
    }

    /// 矩阵中是否存在NaN
    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }
}

/// 将逐行数据打包为二维数组，校验矩形形状
pub(crate) fn rows_to_array(rows: Vec<Vec<f64>>) -> CouplingResult<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);

    if let Some((line, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(shape_mismatch(
            "行长度不一致",
            format!("第{}行有{}个值，期望{ncols}个", line + 1, row.len()),
        ));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| CouplingError::ShapeMismatch(e.to_string()))
}
