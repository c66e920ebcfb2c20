//! 相关系数计算
//!
//! 提供 Pearson 线性相关和 Spearman 秩相关两种度量，通过
//! [`CorrelationMethod`] 统一调度。
//!
//! ## 退化情况
//!
//! 以下情况没有定义良好的相关系数，返回 `Ok(None)`，由调用方决定如何计分：
//! - 有效样本少于2个
//! - 任一序列为常数（例如死通道全零或带直流偏置的恒定值）
//! - Pearson 输入中含有NaN或无穷值

use crate::core::stats::average_ranks;
use crate::error::{CouplingError, CouplingResult, shape_mismatch};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 相关性度量方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// 原始样本的线性相关系数
    #[default]
    Pearson,
    /// 秩相关系数，成对忽略NaN
    Spearman,
}

impl CorrelationMethod {
    /// 计算两条等长序列的相关系数
    ///
    /// 长度不一致返回 `ShapeMismatch`；退化输入返回 `Ok(None)`。
    /// 结果截断到 `[-1, 1]`，消除舍入造成的越界。
    pub fn correlate(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> CouplingResult<Option<f64>> {
        if x.len() != y.len() {
            return Err(shape_mismatch(
                "相关序列长度不一致",
                format!("{} != {}", x.len(), y.len()),
            ));
        }

        let r = match self {
            Self::Pearson => pearson_finite(x.iter().copied(), y.iter().copied(), x.len()),
            Self::Spearman => spearman_omit_nan(x, y),
        };
        Ok(r.map(|v| v.clamp(-1.0, 1.0)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pearson => "Pearson",
            Self::Spearman => "Spearman",
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrelationMethod {
    type Err = CouplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pearson" | "p" => Ok(Self::Pearson),
            "spearman" | "s" => Ok(Self::Spearman),
            other => Err(CouplingError::InvalidParameter(format!(
                "未知的相关方法 / unknown correlation method: {other} (pearson|spearman)"
            ))),
        }
    }
}

/// Pearson 相关系数（切片便捷接口）
pub fn pearson(x: &[f64], y: &[f64]) -> CouplingResult<Option<f64>> {
    CorrelationMethod::Pearson.correlate(ArrayView1::from(x), ArrayView1::from(y))
}

/// Spearman 秩相关系数（切片便捷接口，成对忽略NaN）
pub fn spearman(x: &[f64], y: &[f64]) -> CouplingResult<Option<f64>> {
    CorrelationMethod::Spearman.correlate(ArrayView1::from(x), ArrayView1::from(y))
}

/// 两遍法计算 Pearson 系数：先求均值，再累积离差积
fn pearson_finite(
    x: impl Iterator<Item = f64> + Clone,
    y: impl Iterator<Item = f64> + Clone,
    n: usize,
) -> Option<f64> {
    if n < 2 {
        return None;
    }

    let (mut sum_x, mut sum_y) = (0.0, 0.0);
    let (mut first_x, mut first_y) = (None, None);
    let (mut constant_x, mut constant_y) = (true, true);
    for (a, b) in x.clone().zip(y.clone()) {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        constant_x &= *first_x.get_or_insert(a) == a;
        constant_y &= *first_y.get_or_insert(b) == b;
        sum_x += a;
        sum_y += b;
    }

    // 常数序列的均值有舍入误差，离差平方和不一定恰好为0，需显式判定
    if constant_x || constant_y {
        return None;
    }
    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    // 极端幅值下离差平方和可能溢出为inf
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then_some(r)
}

fn spearman_omit_nan(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    let (kept_x, kept_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();

    if kept_x.len() < 2 {
        return None;
    }

    let rank_x = average_ranks(&kept_x);
    let rank_y = average_ranks(&kept_y);
    pearson_finite(
        rank_x.iter().copied(),
        rank_y.iter().copied(),
        rank_x.len(),
    )
}
