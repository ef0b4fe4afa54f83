//! 孔板边缘检测.
//!
//! 拍到孔壁或照明边缘的图像会产生大片虚假前景. 流水线在阈值分割之前询问
//! [`EdgeDetector`]: 若检测到边缘, 要么跳过整幅图像, 要么把边缘区域清除
//! (填充为最小样本值) 后继续分析.

use crate::consts::defaults::{EDGE_MAX_MEAN, EDGE_MAX_STD_DEV, HISTOGRAM_BINS};
use crate::contour::Connectivity;
use crate::filter::{Histogram, Polarity};
use crate::{BinaryMask, GrayscaleBuffer, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 需要排除的图像区域, 以整幅图像坐标表示.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExclusionRegion {
    rect: Rect,
}

impl ExclusionRegion {
    /// 直接初始化.
    #[inline]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// 覆盖整幅图像.
    #[inline]
    pub const fn whole(shape: crate::Idx2d) -> Self {
        Self::new(Rect::from_shape(shape))
    }

    /// 排除范围.
    #[inline]
    pub const fn rect(&self) -> Rect {
        self.rect
    }
}

/// 边缘检测器. 未检测到边缘时返回 `None`.
///
/// `channels` 为同一位点的全部通道, 第 `i` 个元素对应通道 `i + 1`.
pub trait EdgeDetector {
    /// 检测边缘, 返回需要排除的区域.
    fn detect_edge(&self, channels: &[GrayscaleBuffer]) -> Option<ExclusionRegion>;
}

impl<F> EdgeDetector for F
where
    F: Fn(&[GrayscaleBuffer]) -> Option<ExclusionRegion>,
{
    #[inline]
    fn detect_edge(&self, channels: &[GrayscaleBuffer]) -> Option<ExclusionRegion> {
        self(channels)
    }
}

/// 从不报告边缘.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEdgeDetector;

impl EdgeDetector for NoEdgeDetector {
    #[inline]
    fn detect_edge(&self, _: &[GrayscaleBuffer]) -> Option<ExclusionRegion> {
        None
    }
}

/// 以整幅图像的强度统计判断边缘: 标准差或均值超过上限时, 排除整幅图像.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntensityEdgeDetector {
    /// 检测所用通道 (从 1 开始计数).
    pub channel: usize,

    /// 标准差上限.
    pub max_std_dev: f64,

    /// 均值上限.
    pub max_mean: f64,
}

impl IntensityEdgeDetector {
    /// 以默认上限检测通道 `channel`.
    #[inline]
    pub const fn new(channel: usize) -> Self {
        Self {
            channel,
            max_std_dev: EDGE_MAX_STD_DEV,
            max_mean: EDGE_MAX_MEAN,
        }
    }
}

impl EdgeDetector for IntensityEdgeDetector {
    fn detect_edge(&self, channels: &[GrayscaleBuffer]) -> Option<ExclusionRegion> {
        let buffer = channels.get(self.channel.checked_sub(1)?)?;
        let (mean, std_dev) = buffer.mean_std_dev()?;
        if std_dev > self.max_std_dev || mean > self.max_mean {
            log::debug!("强度异常 (均值 {mean:.1}, 标准差 {std_dev:.1}), 判定为边缘");
            Some(ExclusionRegion::whole(buffer.shape()))
        } else {
            None
        }
    }
}

/// 以贴边的亮区域判断边缘.
///
/// 对原始样本做 256-bin Otsu 分割 (不做预处理), 所有与图像边框相接的前景
/// 4-连通区域的包围盒之并即为排除区域.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BorderContactDetector {
    /// 检测所用通道 (从 1 开始计数).
    pub channel: usize,
}

impl BorderContactDetector {
    /// 检测通道 `channel`.
    #[inline]
    pub const fn new(channel: usize) -> Self {
        Self { channel }
    }
}

impl EdgeDetector for BorderContactDetector {
    fn detect_edge(&self, channels: &[GrayscaleBuffer]) -> Option<ExclusionRegion> {
        let buffer = channels.get(self.channel.checked_sub(1)?)?;
        let img = buffer.to_f64();
        let hist = Histogram::from_values(img.view(), HISTOGRAM_BINS)?;
        let cut = hist.otsu_cut()?;
        let mask = BinaryMask::from(
            img.mapv(|v| cut.is_foreground(hist.bin_of(v), Polarity::BrightObjects)),
        );
        let rect = mask
            .areas(Connectivity::Four, true)
            .into_iter()
            .filter(|area| area.iter().any(|p| mask.is_at_border(*p)))
            .filter_map(Rect::bounding)
            .reduce(|a, b| a.union(&b))?;
        log::debug!("前景与图像边框相接, 排除区域 {rect:?}");
        Some(ExclusionRegion::new(rect))
    }
}
