//! 核质比分析流水线.
//!
//! 每幅图像依次经过: 配置检查, 按用户 ROI 裁剪, 边缘检测, 阈值分割,
//! 形态学清理, 连通区域标记, 对象筛选, 胞质环构造, 强度测量.
//!
//! 单幅图像的分析 ([`NucleoCytoplasmicRatio::analyze_image`]) 不读写任何共享状态,
//! 运行级别的计数由调用方持有的 [`RunContext`] 在图像完成后累计.

use crate::contour::ContourLabeler;
use crate::edge::{EdgeDetector, IntensityEdgeDetector};
use crate::filter::{OtsuThresholder, Thresholder};
use crate::measure::RegionMeasurer;
use crate::morph::MorphologicalCleaner;
use crate::ring::RingExpander;
use crate::{ConfigError, ConfigResult, GrayscaleBuffer, ImageStack, PixelCluster, Rect};

mod config;
mod context;
mod result;
mod stage;

pub use config::AnalysisConfig;
pub use context::{RunContext, RunCounters};
pub use result::{
    AnalysisResult, CellMeasurement, CellRecord, ExclusionReason, ImageStatus, ObjectExclusion,
};
pub use stage::Stage;

use stage::StageTracker;

/// 未命名图像在日志中的标识.
const UNNAMED: &str = "-";

/// 核质比分析器.
///
/// 阈值分割与边缘检测可以替换 (见 [`Self::with_thresholder`] 与
/// [`Self::with_edge_detector`]), 其余步骤由 [`AnalysisConfig`] 决定.
#[derive(Clone, Debug)]
pub struct NucleoCytoplasmicRatio<T = OtsuThresholder, E = IntensityEdgeDetector> {
    config: AnalysisConfig,
    thresholder: T,
    edge_detector: E,
    cleaner: MorphologicalCleaner,
    labeler: ContourLabeler,
    rings: RingExpander,
}

impl NucleoCytoplasmicRatio {
    /// 以 Otsu 分割, 以细胞核通道的强度统计检测边缘.
    ///
    /// 配置中与输入无关的部分 (通道编号, 面积范围) 在此检查.
    pub fn new(config: AnalysisConfig) -> ConfigResult<Self> {
        config.validate_self()?;
        Ok(Self {
            thresholder: OtsuThresholder::new(config.threshold.clone()),
            edge_detector: IntensityEdgeDetector::new(config.nuclear_channel),
            cleaner: MorphologicalCleaner::new(config.cleaner.clone()),
            labeler: ContourLabeler::default(),
            rings: RingExpander::new(config.ring),
            config,
        })
    }
}

impl<T, E> NucleoCytoplasmicRatio<T, E> {
    /// 替换阈值分割方法.
    pub fn with_thresholder<U: Thresholder>(self, thresholder: U) -> NucleoCytoplasmicRatio<U, E> {
        NucleoCytoplasmicRatio {
            config: self.config,
            thresholder,
            edge_detector: self.edge_detector,
            cleaner: self.cleaner,
            labeler: self.labeler,
            rings: self.rings,
        }
    }

    /// 替换边缘检测方法.
    pub fn with_edge_detector<D: EdgeDetector>(self, edge_detector: D) -> NucleoCytoplasmicRatio<T, D> {
        NucleoCytoplasmicRatio {
            config: self.config,
            thresholder: self.thresholder,
            edge_detector,
            cleaner: self.cleaner,
            labeler: self.labeler,
            rings: self.rings,
        }
    }

    /// 替换形态学清理器.
    pub fn with_cleaner(mut self, cleaner: MorphologicalCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl<T: Thresholder, E: EdgeDetector> NucleoCytoplasmicRatio<T, E> {
    /// 分析一幅图像. `channels[i]` 为通道 `i + 1`.
    ///
    /// `user_roi` 为 `None` 时分析整幅图像.
    ///
    /// # 返回值
    ///
    /// 配置与输入不匹配时返回 [`ConfigError`]. 图像被整体跳过 (检测到边缘,
    /// 或无法分割) 不视为错误, 见 [`AnalysisResult::status`].
    #[inline]
    pub fn analyze_image(
        &self,
        channels: &[GrayscaleBuffer],
        user_roi: Option<Rect>,
    ) -> ConfigResult<AnalysisResult> {
        self.run(UNNAMED, channels, user_roi)
    }

    /// 同 [`Self::analyze_image`], 日志中带上位点名称.
    #[inline]
    pub fn analyze_stack(
        &self,
        stack: &ImageStack,
        user_roi: Option<Rect>,
    ) -> ConfigResult<AnalysisResult> {
        self.run(&stack.position, &stack.channels, user_roi)
    }

    /// 分析一幅图像, 完成后把结果累计到 `ctx`.
    ///
    /// 返回错误时 `ctx` 不变.
    pub fn analyze(
        &self,
        channels: &[GrayscaleBuffer],
        user_roi: Option<Rect>,
        ctx: &mut RunContext,
    ) -> ConfigResult<AnalysisResult> {
        let result = self.analyze_image(channels, user_roi)?;
        ctx.accumulate(&result);
        Ok(result)
    }

    fn run(
        &self,
        position: &str,
        channels: &[GrayscaleBuffer],
        user_roi: Option<Rect>,
    ) -> ConfigResult<AnalysisResult> {
        let cfg = &self.config;
        cfg.validate(channels)?;
        let nuclear_full = &channels[cfg.nuclear_channel - 1];
        let ratio_full = &channels[cfg.ratio_channel - 1];

        let shape = nuclear_full.shape();
        let roi = user_roi.unwrap_or(Rect::from_shape(shape));
        if !roi.fits_in(shape) {
            return Err(ConfigError::RoiOutOfBounds { roi, shape });
        }
        let mut nuclear = nuclear_full.crop(roi);
        let mut ratio_channel = ratio_full.crop(roi);
        let local_shape = roi.shape();

        let mut tracker = StageTracker::new(position);
        let edge = self.edge_detector.detect_edge(channels);
        tracker.advance();
        if let Some(region) = edge {
            if cfg.skip_images_with_edges {
                log::info!("[{position}] 检测到边缘 {:?}, 跳过该图像", region.rect());
                let stage = tracker.exclude();
                return Ok(AnalysisResult::skipped(
                    ImageStatus::EdgeSkipped(region.rect()),
                    stage,
                ));
            }
            if let Some(local) = region.rect().localize(&roi) {
                log::debug!("[{position}] 清除边缘区域 {local:?}");
                nuclear = nuclear.with_region_cleared(local);
                ratio_channel = ratio_channel.with_region_cleared(local);
            }
        }

        let mask = match self.thresholder.threshold(&nuclear) {
            Ok(mask) => mask,
            Err(e) => {
                log::info!("[{position}] {e}, 跳过该图像");
                let stage = tracker.exclude();
                return Ok(AnalysisResult::skipped(ImageStatus::Degenerate(e), stage));
            }
        };
        tracker.advance();

        let mask = self.cleaner.clean(&mask);
        tracker.advance();

        let objects = self.labeler.label(&mask);
        tracker.advance();

        let mut result = AnalysisResult::new(tracker.stage());
        result.set_objects_detected(objects.len());
        let origin = roi.origin();
        let bounds_of = |c: &PixelCluster| {
            c.bounding_rect()
                .unwrap_or(Rect::new(0, 0, 0, 0))
                .translate(origin)
        };

        let calibration = nuclear.calibration();
        let mut kept = Vec::with_capacity(objects.len());
        for (index, nucleus) in objects.into_iter().enumerate() {
            let area = nucleus.area(calibration);
            let reason = if area < cfg.min_nucleus_area {
                Some(ExclusionReason::TooSmall(area))
            } else if area > cfg.max_nucleus_area {
                Some(ExclusionReason::TooLarge(area))
            } else if cfg.exclude_border_nuclei && nucleus.touches_border(local_shape) {
                Some(ExclusionReason::TouchesBorder)
            } else {
                None
            };
            match reason {
                Some(reason) => result.exclude(index, bounds_of(&nucleus), reason),
                None => kept.push((index, nucleus)),
            }
        }

        let rings = self.rings.rings_for(kept.iter().map(|(_, n)| n), local_shape);
        tracker.advance();

        let measurer = RegionMeasurer::new(&ratio_channel);
        for ((index, nucleus), ring) in kept.into_iter().zip(rings) {
            if ring.len() < cfg.min_ring_pixels {
                result.exclude(index, bounds_of(&nucleus), ExclusionReason::RingTooThin(ring.len()));
                continue;
            }
            debug_assert!(nucleus.is_disjoint(&ring));
            match measurer.ratio(&nucleus, &ring) {
                Ok((nuclear, cytoplasmic, ratio)) => {
                    let m = CellMeasurement {
                        index,
                        nuclear,
                        cytoplasmic,
                        ratio,
                    };
                    result.push(nucleus.translate(origin), ring.translate(origin), m);
                }
                Err(e) => {
                    log::warn!("[{position}] 对象 #{index} 无法测量: {e}");
                    result.exclude(index, bounds_of(&nucleus), ExclusionReason::Measurement(e));
                }
            }
        }
        tracker.advance();
        tracker.advance();
        result.set_stage(tracker.stage());

        log::debug!(
            "[{position}] {} 个对象, {} 个细胞, 剔除 {} 个",
            result.object_count(),
            result.cell_count(),
            result.exclusions().len()
        );
        Ok(result)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, IndexedParallelIterator, ParallelIterator};

        impl<T, E> NucleoCytoplasmicRatio<T, E>
        where
            T: Thresholder + Sync,
            E: EdgeDetector + Sync,
        {
            /// 并行分析多个位点.
            ///
            /// 各图像互不共享状态; 全部完成后按输入顺序把成功的结果累计到 `ctx`.
            /// 输出与 `stacks` 下标一一对应.
            pub fn par_analyze(
                &self,
                stacks: &[ImageStack],
                ctx: &mut RunContext,
            ) -> Vec<ConfigResult<AnalysisResult>> {
                let mut results = Vec::with_capacity(stacks.len());
                stacks
                    .par_iter()
                    .map(|stack| self.analyze_stack(stack, None))
                    .collect_into_vec(&mut results);
                for result in results.iter().flatten() {
                    ctx.accumulate(result);
                }
                results
            }
        }
    }
}

#[cfg(test)]
mod tests;
