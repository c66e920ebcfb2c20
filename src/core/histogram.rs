//! 质量分数直方图
//!
//! 将 `[-1, 1]` 区间等分为固定数量的bin，统计每个bin内的通道数，
//! 用于报告中观察质量分数的分布。

use serde::Serialize;

/// 相关系数的取值下界
const RANGE_MIN: f64 = -1.0;
/// 相关系数的取值上界
const RANGE_MAX: f64 = 1.0;

/// 单个bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// 区间下界（含）
    pub lower: f64,
    /// 区间上界（最后一个bin含上界，其余不含）
    pub upper: f64,
    /// 落在该区间的分数个数
    pub count: usize,
}

/// 固定宽度直方图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityHistogram {
    bins: Vec<HistogramBin>,
    /// 非有限值不计入任何bin
    skipped: usize,
}

impl QualityHistogram {
    /// 以 `bin_count` 个等宽bin统计 `values`
    ///
    /// `bin_count` 为0时按1处理。超出 `[-1, 1]` 的值归入最近的端点bin。
    pub fn from_scores(values: &[f64], bin_count: usize) -> Self {
        let bin_count = bin_count.max(1);
        let width = (RANGE_MAX - RANGE_MIN) / bin_count as f64;

        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: RANGE_MIN + i as f64 * width,
                upper: if i + 1 == bin_count {
                    RANGE_MAX
                } else {
                    RANGE_MIN + (i + 1) as f64 * width
                },
                count: 0,
            })
            .collect();

        let mut skipped = 0;
        for &value in values {
            if !value.is_finite() {
                skipped += 1;
                continue;
            }
            let index = ((value - RANGE_MIN) / width).floor();
            let index = (index.max(0.0) as usize).min(bin_count - 1);
            bins[index].count += 1;
        }

        Self { bins, skipped }
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// 计入直方图的分数总数
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 计数最多的bin（并列时取靠前者）
    pub fn mode_bin(&self) -> Option<&HistogramBin> {
        self.bins
            .iter()
            .filter(|b| b.count > 0)
            .fold(None, |best: Option<&HistogramBin>, b| match best {
                Some(cur) if cur.count >= b.count => Some(cur),
                _ => Some(b),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_edges_cover_range() {
        let hist = QualityHistogram::from_scores(&[], 4);
        let edges: Vec<(f64, f64)> = hist.bins().iter().map(|b| (b.lower, b.upper)).collect();
        assert_eq!(
            edges,
            vec![(-1.0, -0.5), (-0.5, 0.0), (0.0, 0.5), (0.5, 1.0)]
        );
    }

    #[test]
    fn test_endpoints_and_skipped() {
        let hist = QualityHistogram::from_scores(&[-1.0, 1.0, 0.99, f64::NAN, 0.1], 4);
        let counts: Vec<usize> = hist.bins().iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 2]);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.skipped(), 1);
    }

    #[test]
    fn test_mode_bin() {
        let hist = QualityHistogram::from_scores(&[0.9, 0.95, -0.2], 2);
        let mode = hist.mode_bin().unwrap();
        assert_eq!(mode.count, 2);
        assert_eq!(mode.lower, 0.0);

        assert!(QualityHistogram::from_scores(&[], 3).mode_bin().is_none());
    }

    #[test]
    fn test_zero_bins_treated_as_one() {
        let hist = QualityHistogram::from_scores(&[0.3, -0.3], 0);
        assert_eq!(hist.bins().len(), 1);
        assert_eq!(hist.total(), 2);
    }
}
