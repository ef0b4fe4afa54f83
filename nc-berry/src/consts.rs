//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 叠加图中, 细胞核像素在原灰度上增加的亮度.
    pub const NUCLEUS_OVERLAY: u8 = 30;

    /// 叠加图中, 胞质环像素在原灰度上增加的亮度.
    pub const CYTOPLASM_OVERLAY: u8 = 60;
}

/// 分析参数的默认值.
///
/// 面积以物理单位 (通常为 µm²) 计, 其余以像素计.
pub mod defaults {
    /// 细胞核所在通道 (从 1 开始计数).
    pub const NUCLEAR_CHANNEL: usize = 1;

    /// 计算比值的通道 (从 1 开始计数).
    pub const RATIO_CHANNEL: usize = 2;

    /// 背景扣除的抛物面 (或球) 半径 (像素).
    pub const BACKGROUND_RADIUS: f64 = 5.0;

    /// 高斯平滑的标准差 (像素).
    pub const GAUSSIAN_SIGMA: f64 = 3.0;

    /// 细胞核与胞质环之间的间隔 (膨胀次数).
    pub const RING_GAP: u32 = 2;

    /// 胞质环厚度 (膨胀次数).
    pub const RING_THICKNESS: u32 = 4;

    /// 细胞核最小面积.
    pub const MIN_NUCLEUS_AREA: f64 = 300.0;

    /// 细胞核最大面积.
    pub const MAX_NUCLEUS_AREA: f64 = 1800.0;

    /// 胞质环至少包含的像素个数. 更薄的环 (通常被图像边界截断) 不参与统计.
    pub const MIN_RING_PIXELS: usize = 10;

    /// 分水岭切分的高度容差 (距离图单位, 即像素).
    pub const WATERSHED_TOLERANCE: f64 = 0.5;

    /// Otsu 直方图的 bin 个数.
    pub const HISTOGRAM_BINS: usize = 256;

    /// 判定强度差异为零的相对容差.
    pub const FLAT_EPSILON: f64 = 1e-9;

    /// 边缘强度检测: 标准差上限.
    pub const EDGE_MAX_STD_DEV: f64 = 12500.0;

    /// 边缘强度检测: 均值上限.
    pub const EDGE_MAX_MEAN: f64 = 20000.0;
}

/// 判断 `[min, max]` 的强度范围是否可视为没有差异.
#[inline]
pub(crate) fn is_flat_range(min: f64, max: f64) -> bool {
    max - min <= defaults::FLAT_EPSILON * max.abs().max(1.0)
}
