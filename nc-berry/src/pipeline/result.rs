use super::Stage;
use crate::measure::RegionStats;
use crate::{DegenerateImage, MeasureError, PixelCluster, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个细胞的测量结果.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellMeasurement {
    /// 细胞核在标记顺序中的编号 (从 0 开始).
    pub index: usize,

    /// 细胞核区域统计.
    pub nuclear: RegionStats,

    /// 胞质环区域统计.
    pub cytoplasmic: RegionStats,

    /// 核质比, 即两个区域平均强度之比.
    pub ratio: f64,
}

/// 对象被剔除的原因.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExclusionReason {
    /// 面积小于下限. 携带物理面积.
    TooSmall(f64),
    /// 面积大于上限. 携带物理面积.
    TooLarge(f64),
    /// 与图像 (或 ROI) 边框相接.
    TouchesBorder,
    /// 胞质环像素过少. 携带像素个数.
    RingTooThin(usize),
    /// 测量失败.
    Measurement(MeasureError),
}

/// 被剔除的对象.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectExclusion {
    /// 在标记顺序中的编号.
    pub index: usize,

    /// 包围盒, 以整幅图像坐标表示.
    pub bounds: Rect,

    /// 剔除原因.
    pub reason: ExclusionReason,
}

/// 整幅图像的处理状态.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ImageStatus {
    /// 正常完成分析.
    Analyzed,
    /// 检测到边缘, 按配置跳过.
    EdgeSkipped(Rect),
    /// 无法分割.
    Degenerate(DegenerateImage),
}

impl ImageStatus {
    /// 图像是否被整体跳过.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        !matches!(self, ImageStatus::Analyzed)
    }
}

/// 一个细胞的借用视图.
#[derive(Copy, Clone, Debug)]
pub struct CellRecord<'a> {
    /// 细胞核像素.
    pub nucleus: &'a PixelCluster,
    /// 胞质环像素.
    pub cytoplasm: &'a PixelCluster,
    /// 测量结果.
    pub measurement: &'a CellMeasurement,
}

/// 单幅图像的分析结果.
///
/// `nuclei`, `cytoplasms` 与 `measurements` 下标一一对应.
/// 所有坐标均为整幅图像坐标 (已从用户 ROI 平移回来).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    // 像素集合与测量值体积差异很大, 分开存储.
    nuclei: Vec<PixelCluster>,
    cytoplasms: Vec<PixelCluster>,
    measurements: Vec<CellMeasurement>,
    exclusions: Vec<ObjectExclusion>,
    status: ImageStatus,
    stage: Stage,
    objects_detected: usize,
}

impl AnalysisResult {
    /// 内部方法, 正常完成时初始化.
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            nuclei: Vec::new(),
            cytoplasms: Vec::new(),
            measurements: Vec::new(),
            exclusions: Vec::new(),
            status: ImageStatus::Analyzed,
            stage,
            objects_detected: 0,
        }
    }

    /// 内部方法, 整幅图像被跳过.
    pub(crate) fn skipped(status: ImageStatus, stage: Stage) -> Self {
        Self {
            status,
            ..Self::new(stage)
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, nucleus: PixelCluster, cytoplasm: PixelCluster, m: CellMeasurement) {
        self.nuclei.push(nucleus);
        self.cytoplasms.push(cytoplasm);
        self.measurements.push(m);
    }

    #[inline]
    pub(crate) fn exclude(&mut self, index: usize, bounds: Rect, reason: ExclusionReason) {
        log::debug!("剔除对象 #{index} ({bounds:?}): {reason:?}");
        self.exclusions.push(ObjectExclusion {
            index,
            bounds,
            reason,
        });
    }

    #[inline]
    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    #[inline]
    pub(crate) fn set_objects_detected(&mut self, n: usize) {
        self.objects_detected = n;
    }

    /// 成功测量的细胞个数.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.measurements.len()
    }

    /// 标记出的对象个数 (包括后来被剔除的).
    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects_detected
    }

    /// 细胞核像素集合.
    #[inline]
    pub fn nuclei(&self) -> &[PixelCluster] {
        &self.nuclei
    }

    /// 胞质环像素集合.
    #[inline]
    pub fn cytoplasms(&self) -> &[PixelCluster] {
        &self.cytoplasms
    }

    /// 测量结果.
    #[inline]
    pub fn measurements(&self) -> &[CellMeasurement] {
        &self.measurements
    }

    /// 被剔除的对象.
    #[inline]
    pub fn exclusions(&self) -> &[ObjectExclusion] {
        &self.exclusions
    }

    /// 图像状态.
    #[inline]
    pub fn status(&self) -> ImageStatus {
        self.status
    }

    /// 结束时所处阶段.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 获得第 `index` 个细胞.
    pub fn record(&self, index: usize) -> Option<CellRecord<'_>> {
        Some(CellRecord {
            nucleus: self.nuclei.get(index)?,
            cytoplasm: self.cytoplasms.get(index)?,
            measurement: self.measurements.get(index)?,
        })
    }

    /// 依次迭代全部细胞.
    pub fn records(&self) -> impl Iterator<Item = CellRecord<'_>> + '_ {
        self.nuclei
            .iter()
            .zip(self.cytoplasms.iter())
            .zip(self.measurements.iter())
            .map(|((nucleus, cytoplasm), measurement)| CellRecord {
                nucleus,
                cytoplasm,
                measurement,
            })
    }

    /// 全部核质比.
    pub fn ratios(&self) -> impl Iterator<Item = f64> + '_ {
        self.measurements.iter().map(|m| m.ratio)
    }

    /// 直接获得内部数据的所有权.
    #[inline]
    pub fn into_raw(self) -> (Vec<PixelCluster>, Vec<PixelCluster>, Vec<CellMeasurement>) {
        (self.nuclei, self.cytoplasms, self.measurements)
    }
}
