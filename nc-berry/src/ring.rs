//! 胞质环生成.

use crate::consts::defaults::{RING_GAP, RING_THICKNESS};
use crate::{Idx2d, PixelCluster};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 胞质环几何参数, 均以 4-邻域膨胀次数计.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingGeometry {
    /// 细胞核与胞质环之间的间隔.
    pub gap: u32,

    /// 胞质环厚度.
    pub thickness: u32,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            gap: RING_GAP,
            thickness: RING_THICKNESS,
        }
    }
}

/// 由细胞核 `nucleus` 生成胞质环.
///
/// 1. `G = dilate4^gap(nucleus)`;
/// 2. `R = dilate4^thickness(G)`;
/// 3. 胞质环为 `R \ G`.
///
/// 膨胀在分辨率为 `shape` 的图像边界处截断. 当 `gap = 0` 时胞质环紧贴细胞核;
/// 当 `thickness = 0` 时胞质环为空.
///
/// # 返回值
///
/// 返回的集合与 `nucleus` 不相交, 且恰好等于
/// `dilate4^(gap + thickness)(nucleus) \ dilate4^gap(nucleus)`.
pub fn ring_for(nucleus: &PixelCluster, shape: Idx2d, gap: u32, thickness: u32) -> PixelCluster {
    let inner = nucleus.dilate4_n(shape, gap);
    let outer = inner.dilate4_n(shape, thickness);
    outer.subtract(&inner)
}

/// 按固定几何参数批量生成胞质环.
#[derive(Copy, Clone, Debug, Default)]
pub struct RingExpander {
    geometry: RingGeometry,
}

impl RingExpander {
    /// 直接初始化.
    #[inline]
    pub const fn new(geometry: RingGeometry) -> Self {
        Self { geometry }
    }

    /// 几何参数.
    #[inline]
    pub const fn geometry(&self) -> RingGeometry {
        self.geometry
    }

    /// 同 [`ring_for`].
    #[inline]
    pub fn ring_for(&self, nucleus: &PixelCluster, shape: Idx2d) -> PixelCluster {
        ring_for(nucleus, shape, self.geometry.gap, self.geometry.thickness)
    }

    /// 逐个生成胞质环, 输出与输入按下标一一对应.
    pub fn rings_for<'a, I>(&self, nuclei: I, shape: Idx2d) -> Vec<PixelCluster>
    where
        I: IntoIterator<Item = &'a PixelCluster>,
    {
        nuclei
            .into_iter()
            .map(|n| self.ring_for(n, shape))
            .collect()
    }
}
