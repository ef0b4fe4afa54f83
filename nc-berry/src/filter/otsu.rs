//! Otsu 自动阈值.

use super::Polarity;
use crate::consts::is_flat_range;
use ndarray::ArrayView2;

/// 等宽直方图, 覆盖 `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    min: f64,
    bin_width: f64,
}

impl Histogram {
    /// 统计 `values` 的 `bins` 桶直方图.
    ///
    /// 值为 `v` 的像素落入第 `floor((v - min) / width)` 个桶, 最大值截断到最后一个桶.
    /// 当强度没有差异或 `bins == 0` 时返回 `None`.
    pub fn from_values(values: ArrayView2<f64>, bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() || is_flat_range(min, max) {
            return None;
        }
        let mut ans = Self {
            counts: vec![0; bins],
            min,
            bin_width: (max - min) / bins as f64,
        };
        for &v in values.iter() {
            let b = ans.bin_of(v);
            ans.counts[b] += 1;
        }
        Some(ans)
    }

    /// 桶个数.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// 各桶计数.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// `v` 所在的桶. 超出范围的值截断到首尾两个桶.
    #[inline]
    pub fn bin_of(&self, v: f64) -> usize {
        let b = ((v - self.min) / self.bin_width).floor();
        if b > 0.0 {
            (b as usize).min(self.bins() - 1)
        } else {
            0
        }
    }

    /// 以桶下标为强度计算 Otsu 阈值: 选择使类间方差
    /// `w_b * w_f * (m_b - m_f)²` 最大的 `k`, 背景为 `0..=k` 号桶.
    /// 多个 `k` 并列时取最小者. 不存在有效划分时返回 `None`.
    pub fn otsu_cut(&self) -> Option<OtsuCut> {
        let total: u64 = self.counts.iter().sum();
        let total_sum: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, &c)| i as f64 * c as f64)
            .sum();

        let mut best: Option<(usize, f64)> = None;
        let (mut wb, mut sum_b) = (0u64, 0.0);
        for (k, &c) in self.counts.iter().enumerate().take(self.bins() - 1) {
            wb += c;
            sum_b += k as f64 * c as f64;
            let wf = total - wb;
            if wb == 0 || wf == 0 {
                continue;
            }
            let mb = sum_b / wb as f64;
            let mf = (total_sum - sum_b) / wf as f64;
            let between = wb as f64 * wf as f64 * (mb - mf).powi(2);
            if best.map_or(true, |(_, v)| between > v) {
                best = Some((k, between));
            }
        }

        best.map(|(level, _)| OtsuCut {
            level,
            value: self.min + (level + 1) as f64 * self.bin_width,
        })
    }
}

/// Otsu 阈值.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OtsuCut {
    level: usize,
    value: f64,
}

impl OtsuCut {
    /// 背景的最后一个桶.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// 阈值对应的强度, 即第 `level + 1` 个桶的下边界.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 给定像素所在的桶, 判断它是否为前景.
    #[inline]
    pub fn is_foreground(&self, bin: usize, polarity: Polarity) -> bool {
        match polarity {
            Polarity::BrightObjects => bin > self.level,
            Polarity::DarkObjects => bin <= self.level,
        }
    }
}
