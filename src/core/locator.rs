//! 数组特征定位
//!
//! - [`nearest_index`]：在升序序列中查找最接近给定值的元素索引
//! - [`peak_index`]：在二维数组某一行的列子区间内，按log10刻度寻找峰值位置
//!
//! 典型用法是先用 `nearest_index` 把频率范围换算为频谱矩阵的列边界，
//! 再用 `peak_index` 在该频段内定位峰值。

use crate::error::{CouplingError, CouplingResult, invalid_parameter, shape_mismatch};
use ndarray::ArrayView2;

/// 查找升序序列中最接近 `value` 的元素索引
///
/// 先二分查找左插入点，再比较插入点与其左邻的距离：
/// - 距离相等时取左侧（较小）索引
/// - `value` 大于所有元素时钳制到最后一个索引
/// - `value` 小于所有元素时返回0
///
/// 序列升序由调用方保证，不做校验。空序列或NaN返回 `InvalidParameter`。
pub fn nearest_index(sorted: &[f64], value: f64) -> CouplingResult<usize> {
    if sorted.is_empty() {
        return Err(CouplingError::InvalidParameter(
            "nearest_index: 序列为空 / empty sequence".to_string(),
        ));
    }
    if value.is_nan() {
        return Err(invalid_parameter("nearest_index: 查找值非法", value));
    }

    let idx = sorted.partition_point(|&x| x < value);

    if idx == 0 {
        return Ok(0);
    }
    if idx == sorted.len() {
        return Ok(sorted.len() - 1);
    }

    let left = (value - sorted[idx - 1]).abs();
    let right = (sorted[idx] - value).abs();
    Ok(if left <= right { idx - 1 } else { idx })
}

/// 在 `array[row, col_start..col_end]` 内按log10刻度查找峰值列索引
///
/// 返回相对整行的索引 `col_start + local`。峰值并列时取第一次出现的位置。
///
/// # 错误
/// - `ShapeMismatch`：行越界或 `col_end` 超出列数
/// - `InvalidParameter`：`col_start >= col_end`
/// - `DomainError`：区间内存在 `<= 0` 或NaN的值
pub fn peak_index(
    array: ArrayView2<'_, f64>,
    row: usize,
    col_start: usize,
    col_end: usize,
) -> CouplingResult<usize> {
    let (rows, cols) = array.dim();
    if row >= rows {
        return Err(shape_mismatch("peak_index: 行越界", format!("{row} >= {rows}")));
    }
    if col_end > cols {
        return Err(shape_mismatch(
            "peak_index: 列区间越界",
            format!("{col_start}..{col_end} 超出 {cols} 列"),
        ));
    }
    if col_start >= col_end {
        return Err(invalid_parameter(
            "peak_index: 列区间为空",
            format!("{col_start}..{col_end}"),
        ));
    }

    let segment = array.row(row);
    let mut best: Option<(usize, f64)> = None;

    for col in col_start..col_end {
        let value = segment[col];
        if value.is_nan() || value <= 0.0 {
            return Err(CouplingError::DomainError(format!(
                "log10 需要正数，[{row}, {col}] = {value}"
            )));
        }

        let level = value.log10();
        // 严格大于：并列时保留先出现的位置
        if best.is_none_or(|(_, top)| level > top) {
            best = Some((col, level));
        }
    }

    // 区间非空，best 必有值
    let (peak, level) = best.ok_or_else(|| invalid_parameter("peak_index: 列区间为空", row))?;
    tracing::debug!(row, col_start, col_end, peak, log10 = level, "峰值位置");
    Ok(peak)
}
