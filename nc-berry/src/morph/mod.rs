//! 二值形态学清理.
//!
//! 依次执行带边缘补齐的闭运算, 空洞填充, 以及距离图分水岭切分.
//! 三步都可以单独关闭, 便于做消融实验.

use crate::consts::defaults::WATERSHED_TOLERANCE;
use crate::BinaryMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod close;
mod watershed;

pub use close::close_padded;
pub use watershed::{distance_map, watershed_split};

/// 清理步骤开关.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CleanerOptions {
    /// 3x3 闭运算.
    pub close: bool,

    /// 空洞填充.
    pub fill_holes: bool,

    /// 分水岭切分粘连的细胞核.
    pub watershed: bool,

    /// 分水岭高度容差. 两个盆地的峰值都比汇合处高出至少该值时才切分.
    pub watershed_tolerance: f64,
}

impl Default for CleanerOptions {
    fn default() -> Self {
        Self {
            close: true,
            fill_holes: true,
            watershed: true,
            watershed_tolerance: WATERSHED_TOLERANCE,
        }
    }
}

/// 二值图像清理器.
#[derive(Clone, Debug, Default)]
pub struct MorphologicalCleaner {
    options: CleanerOptions,
}

impl MorphologicalCleaner {
    /// 直接初始化.
    #[inline]
    pub fn new(options: CleanerOptions) -> Self {
        Self { options }
    }

    /// 清理选项.
    #[inline]
    pub fn options(&self) -> &CleanerOptions {
        &self.options
    }

    /// 清理 `mask`, 返回新图像. 输出与输入分辨率相同.
    pub fn clean(&self, mask: &BinaryMask) -> BinaryMask {
        let mut out = if self.options.close {
            close_padded(mask)
        } else {
            mask.clone()
        };
        if self.options.fill_holes && out.fill_holes() {
            log::trace!("填充了二值图像中的空洞");
        }
        if self.options.watershed {
            out = watershed_split(&out, self.options.watershed_tolerance);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::ContourLabeler;
    use crate::synth;

    fn two_touching_disks() -> BinaryMask {
        BinaryMask::from_fn((40, 50), |p| {
            synth::in_disk(p, (20, 15), 10.0) || synth::in_disk(p, (20, 32), 10.0)
        })
    }

    #[test]
    fn test_clean_splits_touching_nuclei() {
        let mask = two_touching_disks();
        let cleaned = MorphologicalCleaner::default().clean(&mask);
        let clusters = ContourLabeler::default().label(&cleaned);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() > 250));
    }

    #[test]
    fn test_clean_without_watershed_keeps_blob() {
        let cleaner = MorphologicalCleaner::new(CleanerOptions {
            watershed: false,
            ..Default::default()
        });
        let cleaned = cleaner.clean(&two_touching_disks());
        assert_eq!(ContourLabeler::default().label(&cleaned).len(), 1);
    }

    #[test]
    fn test_clean_fills_ring() {
        let ring = BinaryMask::from_fn((30, 30), |p| {
            synth::in_disk(p, (15, 15), 8.0) && !synth::in_disk(p, (15, 15), 4.0)
        });
        let cleaned = MorphologicalCleaner::new(CleanerOptions {
            watershed: false,
            ..Default::default()
        })
        .clean(&ring);
        assert!(cleaned[(15, 15)]);
        assert_eq!(cleaned.count(), synth::disk_cluster((15, 15), 8.0, (30, 30)).len());
    }

    #[test]
    fn test_all_steps_disabled_is_identity() {
        let mask = two_touching_disks();
        let cleaner = MorphologicalCleaner::new(CleanerOptions {
            close: false,
            fill_holes: false,
            watershed: false,
            ..Default::default()
        });
        assert_eq!(cleaner.clean(&mask), mask);
    }
}
