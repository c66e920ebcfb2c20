//! 邻道相关性评分引擎
//!
//! 对每个可评分通道 `i`，计算它与后续 `window - 1` 个空间相邻通道
//! （`i+1 ..= i+window-1`）的相关系数，取中位数作为该通道的耦合质量，
//! 再取所有通道质量的中位数作为整条光纤的全局质量。
//!
//! ## 边界策略
//!
//! 可评分通道范围为 `[0, channel_count - window)`。最后 `window` 个通道
//! 没有完整的邻道窗口，不参与评分，通过 [`CouplingScores::unscored_tail`]
//! 显式暴露，避免调用方把较短的质量向量误当作与原通道一一对齐。
//!
//! ## 并行
//!
//! 每个通道的评分相互独立，[`NeighborCorrelationScorer::score_parallel`]
//! 使用rayon线程池按通道并行，每个任务只写自己的行，结果与串行版本逐位一致。
//! 只有全部行计算成功后才替换保存的结果。

use crate::core::channel_matrix::ChannelMatrix;
use crate::core::correlation::CorrelationMethod;
use crate::core::histogram::QualityHistogram;
use crate::core::stats;
use crate::error::{CouplingError, CouplingResult, invalid_parameter};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Range;

/// 默认邻道窗口宽度
pub const DEFAULT_WINDOW_WIDTH: usize = 4;

/// 最小邻道窗口宽度（至少与一个邻道比较）
pub const MIN_WINDOW_WIDTH: usize = 2;

/// 质量分数的均值与中位数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    /// 参与统计的通道数
    pub scored_channels: usize,
}

/// 一次评分的完整结果（调用方持有）
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingScores {
    method: CorrelationMethod,
    window: usize,
    channel_count: usize,

    /// 形状 (usable_channels, window - 1)，`[i, k]` 为通道 i 与 i+k+1 的相关系数
    pairwise: Array2<f64>,

    /// 每个可评分通道的质量（行中位数）
    quality: Vec<f64>,

    /// 质量向量的中位数，无可评分通道时为 `None`
    global_median: Option<f64>,

    /// 退化通道对的数量（按0.0计分）
    degenerate_pairs: usize,
}

impl CouplingScores {
    #[inline]
    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 输入矩阵的总通道数（含未评分尾部）
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// 邻道相关系数矩阵
    #[inline]
    pub fn pairwise(&self) -> ArrayView2<'_, f64> {
        self.pairwise.view()
    }

    /// 单个通道与其各邻道的相关系数
    pub fn neighbor_scores(&self, channel: usize) -> Option<ArrayView1<'_, f64>> {
        (channel < self.pairwise.nrows()).then(|| self.pairwise.row(channel))
    }

    /// 通道质量向量，索引即通道号
    #[inline]
    pub fn quality(&self) -> &[f64] {
        &self.quality
    }

    #[inline]
    pub fn global_median(&self) -> Option<f64> {
        self.global_median
    }

    /// 没有完整邻道窗口、未参与评分的通道范围
    #[inline]
    pub fn unscored_tail(&self) -> Range<usize> {
        self.quality.len()..self.channel_count
    }

    #[inline]
    pub fn degenerate_pairs(&self) -> usize {
        self.degenerate_pairs
    }

    /// 质量向量的均值和中位数
    ///
    /// 没有可评分通道时（`window == channel_count`）返回 `InvalidParameter`。
    pub fn summary_stats(&self) -> CouplingResult<SummaryStats> {
        match (stats::mean(&self.quality), self.global_median) {
            (Some(mean), Some(median)) => Ok(SummaryStats {
                mean,
                median,
                scored_channels: self.quality.len(),
            }),
            _ => Err(invalid_parameter(
                "没有可评分的通道",
                format!("window={} channels={}", self.window, self.channel_count),
            )),
        }
    }

    /// 质量严格低于 `threshold` 的通道（升序）
    pub fn find_bad(&self, threshold: f64) -> CouplingResult<Vec<usize>> {
        if !threshold.is_finite() {
            return Err(invalid_parameter("阈值必须是有限数", threshold));
        }

        Ok(self
            .quality
            .iter()
            .enumerate()
            .filter(|&(_, &q)| q < threshold)
            .map(|(i, _)| i)
            .collect())
    }

    /// 质量分数直方图
    pub fn histogram(&self, bin_count: usize) -> QualityHistogram {
        QualityHistogram::from_scores(&self.quality, bin_count)
    }
}

/// 邻道相关性评分器
#[derive(Debug, Clone)]
pub struct NeighborCorrelationScorer {
    matrix: ChannelMatrix,
    window: usize,

    /// 最近一次评分结果，整体替换
    latest: Option<CouplingScores>,
}

impl NeighborCorrelationScorer {
    /// 创建评分器
    ///
    /// 要求 `2 <= window <= channel_count` 且至少2个样本，否则返回 `InvalidParameter`。
    pub fn new(matrix: ChannelMatrix, window: usize) -> CouplingResult<Self> {
        if window < MIN_WINDOW_WIDTH {
            return Err(invalid_parameter(
                "窗口宽度过小",
                format!("window={window}，至少为{MIN_WINDOW_WIDTH}"),
            ));
        }

        if window > matrix.channel_count() {
            return Err(invalid_parameter(
                "窗口宽度超过通道数",
                format!("window={window} > channels={}", matrix.channel_count()),
            ));
        }

        if matrix.sample_count() < 2 {
            return Err(invalid_parameter(
                "样本数不足",
                format!("samples={}，至少为2", matrix.sample_count()),
            ));
        }

        Ok(Self {
            matrix,
            window,
            latest: None,
        })
    }

    /// 使用默认窗口宽度创建评分器
    pub fn with_default_window(matrix: ChannelMatrix) -> CouplingResult<Self> {
        Self::new(matrix, DEFAULT_WINDOW_WIDTH)
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 可评分通道数 `channel_count - window`
    #[inline]
    pub fn usable_channels(&self) -> usize {
        self.matrix.channel_count() - self.window
    }

    /// 串行评分
    pub fn score(&mut self, method: CorrelationMethod) -> CouplingResult<CouplingScores> {
        let rows = (0..self.usable_channels())
            .map(|i| self.score_channel(method, i))
            .collect::<CouplingResult<Vec<_>>>()?;

        self.commit(method, rows)
    }

    /// 按通道并行评分，`degree` 为线程数
    pub fn score_parallel(
        &mut self,
        method: CorrelationMethod,
        degree: usize,
    ) -> CouplingResult<CouplingScores> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(degree.max(1))
            .thread_name(|i| format!("coupling-worker-{i}"))
            .build()
            .map_err(|e| CouplingError::ResourceError(format!("线程池创建失败: {e}")))?;

        let rows = pool.install(|| {
            (0..self.usable_channels())
                .into_par_iter()
                .map(|i| self.score_channel(method, i))
                .collect::<CouplingResult<Vec<_>>>()
        })?;

        self.commit(method, rows)
    }

    /// 最近一次评分结果
    #[inline]
    pub fn latest(&self) -> Option<&CouplingScores> {
        self.latest.as_ref()
    }

    /// 最近一次评分的均值和中位数
    pub fn summary_stats(&self) -> CouplingResult<SummaryStats> {
        self.latest
            .as_ref()
            .ok_or(CouplingError::NoScoreComputed)?
            .summary_stats()
    }

    /// 最近一次评分中质量严格低于阈值的通道
    pub fn find_bad(&self, threshold: f64) -> CouplingResult<Vec<usize>> {
        self.latest
            .as_ref()
            .ok_or(CouplingError::NoScoreComputed)?
            .find_bad(threshold)
    }

    /// 计算单个通道与其邻道的相关系数行，返回 (行, 退化对数)
    fn score_channel(
        &self,
        method: CorrelationMethod,
        channel: usize,
    ) -> CouplingResult<(Vec<f64>, usize)> {
        let base = self.matrix.channel(channel)?;
        let mut row = Vec::with_capacity(self.window - 1);
        let mut degenerate = 0;

        for offset in 1..self.window {
            let neighbor = self.matrix.channel(channel + offset)?;
            let r = match method.correlate(base, neighbor)? {
                Some(r) => r,
                None => {
                    degenerate += 1;
                    0.0
                }
            };
            tracing::trace!(channel, neighbor = channel + offset, r, "邻道相关系数");
            row.push(r);
        }

        Ok((row, degenerate))
    }

    /// 汇总各行并整体替换保存的结果
    fn commit(
        &mut self,
        method: CorrelationMethod,
        rows: Vec<(Vec<f64>, usize)>,
    ) -> CouplingResult<CouplingScores> {
        let usable = rows.len();
        let width = self.window - 1;

        let mut quality = Vec::with_capacity(usable);
        let mut degenerate_pairs = 0;
        let mut flat = Vec::with_capacity(usable * width);

        for (row, degenerate) in rows {
            // 行非空：window >= 2
            quality.push(stats::median(&row).unwrap_or(0.0));
            degenerate_pairs += degenerate;
            flat.extend(row);
        }

        let pairwise = Array2::from_shape_vec((usable, width), flat)
            .map_err(|e| CouplingError::ShapeMismatch(e.to_string()))?;
        let global_median = stats::median(&quality);

        tracing::debug!(
            method = method.name(),
            window = self.window,
            channels = self.matrix.channel_count(),
            scored = usable,
            degenerate_pairs,
            global_median = ?global_median,
            "邻道相关性评分完成"
        );

        let scores = CouplingScores {
            method,
            window: self.window,
            channel_count: self.matrix.channel_count(),
            pairwise,
            quality,
            global_median,
            degenerate_pairs,
        };
        self.latest = Some(scores.clone());
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// 每个通道是同一条斜坡加上按通道缩放
    fn ramp_matrix(channels: usize, samples: usize) -> ChannelMatrix {
        ChannelMatrix::new(Array2::from_shape_fn((samples, channels), |(s, c)| {
            (s as f64) * (c as f64 + 1.0)
        }))
    }

    #[test]
    fn test_window_validation() {
        assert!(matches!(
            NeighborCorrelationScorer::new(ramp_matrix(5, 10), 1),
            Err(CouplingError::InvalidParameter(_))
        ));
        assert!(matches!(
            NeighborCorrelationScorer::new(ramp_matrix(5, 10), 6),
            Err(CouplingError::InvalidParameter(_))
        ));
        assert!(NeighborCorrelationScorer::new(ramp_matrix(5, 10), 5).is_ok());
    }

    #[test]
    fn test_too_few_samples() {
        assert!(matches!(
            NeighborCorrelationScorer::new(ramp_matrix(5, 1), 2),
            Err(CouplingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_pairwise_shape_has_no_reserved_column() {
        let mut scorer = NeighborCorrelationScorer::new(ramp_matrix(8, 20), 4).unwrap();
        let scores = scorer.score(CorrelationMethod::Pearson).unwrap();
        assert_eq!(scores.pairwise().dim(), (4, 3));
        assert_eq!(scores.quality().len(), 4);
        assert_eq!(scores.unscored_tail(), 4..8);
        for &r in scores.pairwise().iter() {
            assert!((r - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_calls_before_score() {
        let scorer = NeighborCorrelationScorer::with_default_window(ramp_matrix(6, 10)).unwrap();
        assert!(matches!(
            scorer.summary_stats(),
            Err(CouplingError::NoScoreComputed)
        ));
        assert!(matches!(
            scorer.find_bad(0.5),
            Err(CouplingError::NoScoreComputed)
        ));
        assert!(scorer.latest().is_none());
    }

    #[test]
    fn test_window_equal_to_channels_yields_empty_scores() {
        let mut scorer = NeighborCorrelationScorer::new(ramp_matrix(4, 10), 4).unwrap();
        let scores = scorer.score(CorrelationMethod::Spearman).unwrap();
        assert!(scores.quality().is_empty());
        assert_eq!(scores.global_median(), None);
        assert_eq!(scores.unscored_tail(), 0..4);
        assert!(scorer.find_bad(0.5).unwrap().is_empty());
        assert!(matches!(
            scorer.summary_stats(),
            Err(CouplingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_dead_channel_scores_zero() {
        let mut data = Array2::from_shape_fn((30, 6), |(s, _)| (s as f64 * 0.3).sin());
        data.column_mut(0).fill(0.0);
        let mut scorer = NeighborCorrelationScorer::new(ChannelMatrix::new(data), 3).unwrap();
        let scores = scorer.score(CorrelationMethod::Pearson).unwrap();

        assert_eq!(scores.quality()[0], 0.0);
        assert_eq!(scores.degenerate_pairs(), 2);
        assert_eq!(scorer.find_bad(0.5).unwrap(), vec![0]);
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let mut scorer = NeighborCorrelationScorer::new(ramp_matrix(6, 10), 2).unwrap();
        scorer.score(CorrelationMethod::Pearson).unwrap();
        assert!(matches!(
            scorer.find_bad(f64::NAN),
            Err(CouplingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut scorer = NeighborCorrelationScorer::new(ramp_matrix(6, 10), 2).unwrap();
        let scores = scorer.score(CorrelationMethod::Pearson).unwrap();
        let q0 = scores.quality()[0];
        assert!(!scores.find_bad(q0).unwrap().contains(&0));
        assert!(scores.find_bad(q0 + 1e-9).unwrap().contains(&0));
    }

    #[test]
    fn test_rescore_replaces_latest() {
        let mut scorer = NeighborCorrelationScorer::new(ramp_matrix(6, 10), 3).unwrap();
        scorer.score(CorrelationMethod::Pearson).unwrap();
        assert_eq!(
            scorer.latest().unwrap().method(),
            CorrelationMethod::Pearson
        );
        scorer.score(CorrelationMethod::Spearman).unwrap();
        assert_eq!(
            scorer.latest().unwrap().method(),
            CorrelationMethod::Spearman
        );
    }
}
