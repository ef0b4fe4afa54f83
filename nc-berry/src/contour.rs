//! 连通区域提取.
//!
//! 二值图像中的每个前景连通区域对应一个外轮廓, 轮廓所围住的全部像素
//! (包括区域内部的背景空洞) 构成一个 [`PixelCluster`].

use crate::data::iter::PosIter;
use crate::data::{neighbour4, neighbour8};
use crate::{BinaryMask, Idx2d, PixelCluster, Rect};
use itertools::Either;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素连通规则.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connectivity {
    /// 上下左右.
    #[default]
    Four,

    /// 上下左右及对角.
    Eight,
}

impl Connectivity {
    /// 获得 `pos` 的邻居索引. 不检查越界.
    #[inline]
    pub(crate) fn neighbours(self, pos: Idx2d) -> impl Iterator<Item = Idx2d> {
        match self {
            Connectivity::Four => Either::Left(neighbour4(pos).into_iter()),
            Connectivity::Eight => Either::Right(neighbour8(pos).into_iter()),
        }
    }

    /// 对偶连通规则. 前景按 `self` 连通时, 背景应按对偶规则连通,
    /// 才能保证闭合轮廓确实把内外分开.
    #[inline]
    pub const fn dual(self) -> Connectivity {
        match self {
            Connectivity::Four => Connectivity::Eight,
            Connectivity::Eight => Connectivity::Four,
        }
    }
}

/// 连通区域提取器.
#[derive(Copy, Clone, Debug, Default)]
pub struct ContourLabeler {
    connectivity: Connectivity,
}

impl ContourLabeler {
    /// 直接初始化.
    #[inline]
    pub const fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// 连通规则.
    #[inline]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// 提取 `mask` 中的全部区域.
    ///
    /// 返回顺序即发现顺序: 按行优先扫描, 第一个像素先被扫描到的区域排在前面.
    /// 该下标在后续流程中作为对象的身份.
    ///
    /// # 注意
    ///
    /// 完全落在另一区域空洞中的 "岛" 已被外层区域包含, 不会再单独输出,
    /// 因此输出的区域两两不相交.
    pub fn label(&self, mask: &BinaryMask) -> Vec<PixelCluster> {
        let mut claimed = BinaryMask::new(mask.shape());
        let mut ans = Vec::new();
        for area in mask.areas(self.connectivity, true) {
            if claimed[area[0]] {
                continue;
            }
            let cluster = self.enclosed(&area);
            cluster.iter().for_each(|p| claimed[p] = true);
            ans.push(cluster);
        }
        ans
    }

    /// 区域 `area` 的外轮廓所围住的全部像素.
    ///
    /// 在包围盒外扩一圈的局部网格上, 从角落按对偶连通规则泛洪;
    /// 所有未被泛洪到达的像素即为轮廓内部.
    fn enclosed(&self, area: &[Idx2d]) -> PixelCluster {
        let Some(bbox) = Rect::bounding(area.iter().copied()) else {
            return PixelCluster::new();
        };
        let (top, left) = bbox.origin();
        let local_shape = (bbox.height() + 2, bbox.width() + 2);

        let mut wall = BinaryMask::new(local_shape);
        for &(h, w) in area {
            wall[(h - top + 1, w - left + 1)] = true;
        }

        let outer = self.connectivity.dual();
        let mut outside = BinaryMask::new(local_shape);
        let mut q = VecDeque::from([(0, 0)]);
        outside[(0, 0)] = true;
        while let Some(cur) = q.pop_front() {
            for n in outer.neighbours(cur) {
                if wall.get(n) == Some(false) && !outside[n] {
                    outside[n] = true;
                    q.push_back(n);
                }
            }
        }

        PosIter::within(Rect::new(1, 1, bbox.height(), bbox.width()))
            .filter(|p| !outside[*p])
            .map(|(h, w)| (h - 1 + top, w - 1 + left))
            .collect()
    }
}
