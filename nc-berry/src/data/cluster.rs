use super::{Calibration, Rect};
use crate::Idx2d;
use std::collections::hash_set::Iter;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素坐标集合, 用来表示一个细胞核或一个胞质环.
///
/// 集合保证坐标唯一. 构造完成后对外只读.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCluster {
    pixels: HashSet<Idx2d>,
}

impl FromIterator<Idx2d> for PixelCluster {
    fn from_iter<T: IntoIterator<Item = Idx2d>>(iter: T) -> Self {
        Self {
            pixels: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PixelCluster {
    type Item = &'a Idx2d;
    type IntoIter = Iter<'a, Idx2d>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

impl PixelCluster {
    /// 空集合.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部方法, 添加元素. 返回是否为新元素.
    #[inline]
    pub(crate) fn insert(&mut self, pos: Idx2d) -> bool {
        self.pixels.insert(pos)
    }

    /// 像素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// 是否包含 `pos`.
    #[inline]
    pub fn contains(&self, pos: Idx2d) -> bool {
        self.pixels.contains(&pos)
    }

    /// 获取能迭代全部坐标的迭代器. 顺序不确定.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Idx2d> + '_ {
        self.pixels.iter().copied()
    }

    /// 以行优先顺序排列的全部坐标.
    pub fn to_sorted_vec(&self) -> Vec<Idx2d> {
        let mut v: Vec<Idx2d> = self.iter().collect();
        v.sort_unstable();
        v
    }

    /// 包围盒. 空集合返回 `None`.
    #[inline]
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(self.iter())
    }

    /// 物理面积.
    #[inline]
    pub fn area(&self, calibration: &Calibration) -> f64 {
        self.len() as f64 * calibration.pixel_area()
    }

    /// 是否有像素位于分辨率为 `shape` 的图像边缘.
    pub fn touches_border(&self, (h, w): Idx2d) -> bool {
        self.iter()
            .any(|(ph, pw)| ph == 0 || pw == 0 || ph + 1 >= h || pw + 1 >= w)
    }

    /// 轮廓像素: 至少有一个 4-邻居不在集合内的像素.
    pub fn outline(&self) -> PixelCluster {
        self.iter()
            .filter(|&pos| {
                super::neighbour4(pos)
                    .into_iter()
                    .any(|n| !self.contains(n))
            })
            .collect()
    }

    /// 以 4-邻域在分辨率为 `shape` 的图像上膨胀一次. 结果不会越界.
    #[inline]
    pub fn dilate4(&self, shape: Idx2d) -> PixelCluster {
        self.dilate4_n(shape, 1)
    }

    /// 以 4-邻域在分辨率为 `shape` 的图像上膨胀 `rounds` 次. 结果不会越界.
    ///
    /// 每一轮只从上一轮新加入的像素 (前沿) 出发, 因此总代价与结果大小成正比.
    /// 图像外的像素不会被加入, 也不会作为中转.
    pub fn dilate4_n(&self, (h, w): Idx2d, rounds: u32) -> PixelCluster {
        let mut out = self.clone();
        let mut frontier: Vec<Idx2d> = self.iter().collect();
        for _ in 0..rounds {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::with_capacity(frontier.len());
            for pos in frontier {
                for n in super::neighbour4(pos) {
                    if n.0 < h && n.1 < w && out.insert(n) {
                        next.push(n);
                    }
                }
            }
            frontier = next;
        }
        out
    }

    /// 差集 `self \ other`.
    pub fn subtract(&self, other: &PixelCluster) -> PixelCluster {
        self.pixels.difference(&other.pixels).copied().collect()
    }

    /// 两集合是否不相交.
    #[inline]
    pub fn is_disjoint(&self, other: &PixelCluster) -> bool {
        self.pixels.is_disjoint(&other.pixels)
    }

    /// `self` 是否是 `other` 的子集.
    #[inline]
    pub fn is_subset(&self, other: &PixelCluster) -> bool {
        self.pixels.is_subset(&other.pixels)
    }

    /// 将局部坐标平移到以 `origin` 为原点的上级坐标系.
    pub fn translate(&self, (dh, dw): Idx2d) -> PixelCluster {
        self.iter().map(|(h, w)| (h + dh, w + dw)).collect()
    }
}
