use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 轴对齐矩形, 左上角为 `(top, left)`, 左闭右开.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    top: usize,
    left: usize,
    height: usize,
    width: usize,
}

impl Rect {
    /// 直接初始化.
    #[inline]
    pub const fn new(top: usize, left: usize, height: usize, width: usize) -> Self {
        Self {
            top,
            left,
            height,
            width,
        }
    }

    /// 覆盖分辨率为 `shape` 的整幅图像的矩形.
    #[inline]
    pub const fn from_shape((height, width): Idx2d) -> Self {
        Self::new(0, 0, height, width)
    }

    /// 包含所有给定点的最小矩形. 没有点时返回 `None`.
    pub fn bounding<I: IntoIterator<Item = Idx2d>>(it: I) -> Option<Self> {
        let mut it = it.into_iter();
        let (h, w) = it.next()?;
        let (mut min_h, mut min_w, mut max_h, mut max_w) = (h, w, h, w);
        for (h, w) in it {
            min_h = min_h.min(h);
            min_w = min_w.min(w);
            max_h = max_h.max(h);
            max_w = max_w.max(w);
        }
        Some(Self::new(min_h, min_w, max_h - min_h + 1, max_w - min_w + 1))
    }

    /// 左上角.
    #[inline]
    pub const fn origin(&self) -> Idx2d {
        (self.top, self.left)
    }

    /// 上边界 (含).
    #[inline]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// 左边界 (含).
    #[inline]
    pub const fn left(&self) -> usize {
        self.left
    }

    /// 高.
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// 宽.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// 下边界 (不含).
    #[inline]
    pub const fn bottom(&self) -> usize {
        self.top + self.height
    }

    /// 右边界 (不含).
    #[inline]
    pub const fn right(&self) -> usize {
        self.left + self.width
    }

    /// 分辨率 (高, 宽).
    #[inline]
    pub const fn shape(&self) -> Idx2d {
        (self.height, self.width)
    }

    /// 是否不含任何像素.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// `pos` 是否落在矩形内.
    #[inline]
    pub const fn contains(&self, (h, w): Idx2d) -> bool {
        h >= self.top && h < self.bottom() && w >= self.left && w < self.right()
    }

    /// 矩形非空, 且完全落在分辨率为 `shape` 的图像内.
    #[inline]
    pub const fn fits_in(&self, (h, w): Idx2d) -> bool {
        !self.is_empty() && self.bottom() <= h && self.right() <= w
    }

    /// 两矩形的交集. 交集为空时返回 `None`.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        (top < bottom && left < right).then(|| Rect::new(top, left, bottom - top, right - left))
    }

    /// 同时包含两矩形的最小矩形.
    pub fn union(&self, other: &Rect) -> Rect {
        let top = self.top.min(other.top);
        let left = self.left.min(other.left);
        let bottom = self.bottom().max(other.bottom());
        let right = self.right().max(other.right());
        Rect::new(top, left, bottom - top, right - left)
    }

    /// 将局部坐标系下的矩形平移到以 `origin` 为原点的上级坐标系.
    #[inline]
    pub const fn translate(&self, (dh, dw): Idx2d) -> Rect {
        Rect::new(self.top + dh, self.left + dw, self.height, self.width)
    }

    /// 将整幅图像坐标系下的矩形换算到子区域 `region` 的局部坐标系.
    /// 两者不相交时返回 `None`.
    pub fn localize(&self, region: &Rect) -> Option<Rect> {
        let hit = self.intersect(region)?;
        Some(Rect::new(
            hit.top - region.top,
            hit.left - region.left,
            hit.height,
            hit.width,
        ))
    }

    /// 以行优先规则, 获取能迭代矩形内所有索引的迭代器.
    #[inline]
    pub fn pos_iter(&self) -> super::iter::PosIter {
        super::iter::PosIter::within(*self)
    }
}
