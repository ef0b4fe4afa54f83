//! 区域强度统计.

use crate::{GrayscaleBuffer, MeasureError, PixelCluster};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个区域的强度统计.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionStats {
    count: usize,
    sum: f64,
    mean: f64,
}

impl RegionStats {
    /// 像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 强度之和.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// 平均强度.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

/// 在 `buffer` 上统计 `cluster` 覆盖的像素.
///
/// 整数样本之和在 2^53 以内可被 `f64` 精确表示, 因此结果与遍历顺序无关.
///
/// # 注意
///
/// - 空区域返回 [`MeasureError::EmptyCluster`];
/// - 任何坐标越界返回 [`MeasureError::OutOfBounds`], 不会截断后继续统计.
pub fn measure(cluster: &PixelCluster, buffer: &GrayscaleBuffer) -> Result<RegionStats, MeasureError> {
    if cluster.is_empty() {
        return Err(MeasureError::EmptyCluster);
    }
    let mut sum = 0.0;
    for pos in cluster.iter() {
        sum += buffer.get(pos).ok_or(MeasureError::OutOfBounds(pos))?;
    }
    let count = cluster.len();
    Ok(RegionStats {
        count,
        sum,
        mean: sum / count as f64,
    })
}

/// 核质比 `nuclear.mean / cytoplasmic.mean`.
pub fn ratio(nuclear: &RegionStats, cytoplasmic: &RegionStats) -> Result<f64, MeasureError> {
    if cytoplasmic.mean == 0.0 {
        return Err(MeasureError::ZeroDenominator);
    }
    Ok(nuclear.mean / cytoplasmic.mean)
}

/// 绑定在某一幅图像上的测量器.
#[derive(Copy, Clone, Debug)]
pub struct RegionMeasurer<'a> {
    buffer: &'a GrayscaleBuffer,
}

impl<'a> RegionMeasurer<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(buffer: &'a GrayscaleBuffer) -> Self {
        Self { buffer }
    }

    /// 同 [`measure`].
    #[inline]
    pub fn measure(&self, cluster: &PixelCluster) -> Result<RegionStats, MeasureError> {
        measure(cluster, self.buffer)
    }

    /// 依次测量细胞核与胞质环, 并计算二者平均强度之比.
    pub fn ratio(
        &self,
        nucleus: &PixelCluster,
        cytoplasm: &PixelCluster,
    ) -> Result<(RegionStats, RegionStats, f64), MeasureError> {
        let nuclear = self.measure(nucleus)?;
        let cytoplasmic = self.measure(cytoplasm)?;
        let r = ratio(&nuclear, &cytoplasmic)?;
        Ok((nuclear, cytoplasmic, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::f64_eq;
    use ndarray::Array2;

    fn ramp() -> GrayscaleBuffer {
        GrayscaleBuffer::uncalibrated(Array2::from_shape_fn((4, 4), |(h, w)| (h * 4 + w) as u16))
    }

    #[test]
    fn test_measure_mean() {
        let buf = ramp();
        let c: PixelCluster = [(0, 0), (0, 1), (3, 3)].into_iter().collect();
        let stats = measure(&c, &buf).unwrap();
        assert_eq!(stats.count(), 3);
        assert!(f64_eq(stats.sum(), 16.0, 1e-12));
        assert!(f64_eq(stats.mean(), 16.0 / 3.0, 1e-12));
    }

    #[test]
    fn test_empty_and_out_of_bounds() {
        let buf = ramp();
        assert_eq!(measure(&PixelCluster::new(), &buf), Err(MeasureError::EmptyCluster));
        let c: PixelCluster = [(1, 1), (4, 0)].into_iter().collect();
        assert_eq!(measure(&c, &buf), Err(MeasureError::OutOfBounds((4, 0))));
    }

    #[test]
    fn test_ratio() {
        let buf = ramp();
        let m = RegionMeasurer::new(&buf);
        let nucleus: PixelCluster = [(3, 3)].into_iter().collect();
        let ring: PixelCluster = [(0, 1), (0, 2)].into_iter().collect();
        let (n, c, r) = m.ratio(&nucleus, &ring).unwrap();
        assert_eq!(n.count(), 1);
        assert_eq!(c.count(), 2);
        assert!(f64_eq(r, 10.0, 1e-12));

        let dark: PixelCluster = [(0, 0)].into_iter().collect();
        assert_eq!(m.ratio(&nucleus, &dark), Err(MeasureError::ZeroDenominator));
    }
}
