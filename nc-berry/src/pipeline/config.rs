use crate::consts::defaults::*;
use crate::filter::ThresholdParams;
use crate::morph::CleanerOptions;
use crate::ring::RingGeometry;
use crate::{ConfigError, ConfigResult, GrayscaleBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单幅图像分析的全部配置.
///
/// 通道编号从 1 开始. 面积以细胞核通道的物理单位计 (通常为 µm²).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// 细胞核所在通道.
    pub nuclear_channel: usize,

    /// 计算比值的通道.
    pub ratio_channel: usize,

    /// 细胞核最小面积.
    pub min_nucleus_area: f64,

    /// 细胞核最大面积.
    pub max_nucleus_area: f64,

    /// 胞质环几何参数.
    pub ring: RingGeometry,

    /// 检测到边缘时是否跳过整幅图像. 为 `false` 时只清除边缘区域.
    ///
    /// 边缘由分析器的 [`EdgeDetector`](crate::edge::EdgeDetector) 报告,
    /// 默认检测细胞核通道的强度统计.
    pub skip_images_with_edges: bool,

    /// 是否剔除与图像 (或用户 ROI) 边框相接的细胞核.
    pub exclude_border_nuclei: bool,

    /// 胞质环至少包含的像素个数.
    pub min_ring_pixels: usize,

    /// 阈值分割参数.
    pub threshold: ThresholdParams,

    /// 形态学清理参数.
    pub cleaner: CleanerOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            nuclear_channel: NUCLEAR_CHANNEL,
            ratio_channel: RATIO_CHANNEL,
            min_nucleus_area: MIN_NUCLEUS_AREA,
            max_nucleus_area: MAX_NUCLEUS_AREA,
            ring: RingGeometry::default(),
            skip_images_with_edges: true,
            exclude_border_nuclei: false,
            min_ring_pixels: MIN_RING_PIXELS,
            threshold: ThresholdParams::default(),
            cleaner: CleanerOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// 需要的最少通道个数.
    #[inline]
    pub fn required_channels(&self) -> usize {
        self.nuclear_channel.max(self.ratio_channel)
    }

    /// 检查与输入无关的配置项.
    pub fn validate_self(&self) -> ConfigResult<()> {
        for channel in [self.nuclear_channel, self.ratio_channel] {
            if channel == 0 {
                return Err(ConfigError::InvalidChannel(channel));
            }
        }
        let (min, max) = (self.min_nucleus_area, self.max_nucleus_area);
        if !(min >= 0.0) || !(max >= min) || max.is_nan() {
            return Err(ConfigError::InvalidSizeRange { min, max });
        }
        Ok(())
    }

    /// 检查配置与给定通道是否匹配.
    pub fn validate(&self, channels: &[GrayscaleBuffer]) -> ConfigResult<()> {
        self.validate_self()?;
        let required = self.required_channels();
        if channels.len() < required {
            return Err(ConfigError::NotEnoughChannels {
                required,
                got: channels.len(),
            });
        }
        let expected = channels[self.nuclear_channel - 1].shape();
        let found = channels[self.ratio_channel - 1].shape();
        if expected != found {
            return Err(ConfigError::ShapeMismatch { expected, found });
        }
        Ok(())
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        /// 二进制编码, 便于把同一份配置分发给多个分析任务.
        impl AnalysisConfig {
            /// 编码为字节序列.
            pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
                bincode::serialize(self)
            }

            /// 从字节序列解码.
            pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
                bincode::deserialize(bytes)
            }
        }
    }
}
