use super::AnalysisResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一次运行中累计的计数.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunCounters {
    /// 成功测量的细胞总数.
    pub cell_count: usize,

    /// 标记出的对象总数.
    pub object_count: usize,

    /// 完成分析的图像个数.
    pub images_analyzed: usize,

    /// 被整体跳过的图像个数.
    pub images_skipped: usize,

    /// 被剔除的对象总数.
    pub objects_excluded: usize,
}

/// 运行上下文. 由调用方持有, 在每幅图像完成后累计计数.
///
/// 多幅图像并行处理时, 各图像的分析互不共享状态,
/// 计数在全部完成后按输入顺序累计.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    counters: RunCounters,
}

impl RunContext {
    /// 新的运行.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前计数.
    #[inline]
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// 累计一幅图像的结果.
    pub fn accumulate(&mut self, result: &AnalysisResult) {
        let c = &mut self.counters;
        if result.status().is_skipped() {
            c.images_skipped += 1;
            return;
        }
        c.images_analyzed += 1;
        c.cell_count += result.cell_count();
        c.object_count += result.object_count();
        c.objects_excluded += result.exclusions().len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ImageStatus, Stage};
    use crate::DegenerateImage;

    #[test]
    fn test_skipped_image_only_bumps_skip_count() {
        let mut ctx = RunContext::new();
        ctx.accumulate(&AnalysisResult::skipped(
            ImageStatus::Degenerate(DegenerateImage::NoSeparableForeground),
            Stage::Excluded,
        ));
        assert_eq!(
            ctx.counters(),
            RunCounters {
                images_skipped: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_analyzed_image_counts() {
        let mut ctx = RunContext::new();
        let mut result = AnalysisResult::new(Stage::Done);
        result.set_objects_detected(3);
        result.exclude(
            0,
            crate::Rect::new(0, 0, 2, 2),
            crate::pipeline::ExclusionReason::TouchesBorder,
        );
        ctx.accumulate(&result);
        ctx.accumulate(&result);
        let c = ctx.counters();
        assert_eq!(c.images_analyzed, 2);
        assert_eq!(c.object_count, 6);
        assert_eq!(c.objects_excluded, 2);
        assert_eq!(c.cell_count, 0);
    }
}
