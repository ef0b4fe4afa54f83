//! 错误类型.
//!
//! 三类错误对应三种处理粒度:
//!
//! - [`ConfigError`]: 调用方的配置或输入不合法, 直接返回给调用方;
//! - [`DegenerateImage`]: 单张图像无法分割, 跳过该图像, 运行继续;
//! - [`MeasureError`]: 单个对象无法测量, 剔除该对象, 图像继续.

use crate::{Idx2d, Rect};
use thiserror::Error;

/// 配置或输入错误.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 通道数量不足.
    #[error("需要至少 {required} 个通道, 但只提供了 {got} 个")]
    NotEnoughChannels {
        /// 配置所需的通道个数.
        required: usize,
        /// 实际提供的通道个数.
        got: usize,
    },

    /// 通道编号无效 (编号从 1 开始).
    #[error("通道编号 `{0}` 无效, 通道编号从 1 开始")]
    InvalidChannel(usize),

    /// 细胞核通道与比值通道分辨率不一致.
    #[error("通道分辨率不一致: {expected:?} 与 {found:?}")]
    ShapeMismatch {
        /// 细胞核通道的分辨率.
        expected: Idx2d,
        /// 比值通道的分辨率.
        found: Idx2d,
    },

    /// 细胞核面积范围无效.
    #[error("细胞核面积范围 [{min}, {max}] 无效")]
    InvalidSizeRange {
        /// 下限.
        min: f64,
        /// 上限.
        max: f64,
    },

    /// 用户 ROI 超出图像范围, 或者为空.
    #[error("用户 ROI {roi:?} 不在图像 {shape:?} 范围内")]
    RoiOutOfBounds {
        /// 用户 ROI.
        roi: Rect,
        /// 图像分辨率.
        shape: Idx2d,
    },
}

/// 配置相关操作的结果.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 图像无法进行阈值分割.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegenerateImage {
    /// 原始样本强度没有差异.
    #[error("图像强度没有差异")]
    FlatImage,

    /// 预处理后无法找到前景与背景的分割.
    #[error("无法分离前景与背景")]
    NoSeparableForeground,
}

/// 区域测量错误.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasureError {
    /// 区域不含任何像素.
    #[error("区域为空")]
    EmptyCluster,

    /// 区域包含越界的坐标.
    #[error("坐标 {0:?} 越界")]
    OutOfBounds(Idx2d),

    /// 胞质平均强度为零, 比值无定义.
    #[error("胞质平均强度为零")]
    ZeroDenominator,
}
