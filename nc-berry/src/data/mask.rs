use super::iter::PosIter;
use crate::contour::Connectivity;
use crate::{Area2d, Areas2d, Idx2d};
use ndarray::{Array2, ArrayView2};
use std::collections::{HashSet, VecDeque};
use std::ops::{Index, IndexMut};

/// 二值图像. `true` 为前景, `false` 为背景.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryMask {
    data: Array2<bool>,
}

impl Index<Idx2d> for BinaryMask {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for BinaryMask {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl From<Array2<bool>> for BinaryMask {
    #[inline]
    fn from(data: Array2<bool>) -> Self {
        Self { data }
    }
}

impl BinaryMask {
    /// 全背景图像.
    #[inline]
    pub fn new(shape: Idx2d) -> Self {
        Self {
            data: Array2::from_elem(shape, false),
        }
    }

    /// 以 `f(pos)` 决定每个像素是否为前景.
    #[inline]
    pub fn from_fn<F: FnMut(Idx2d) -> bool>(shape: Idx2d, f: F) -> Self {
        Self {
            data: Array2::from_shape_fn(shape, f),
        }
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<bool> {
        self.data.view()
    }

    /// 直接获得内部数据的所有权.
    #[inline]
    pub fn into_raw(self) -> Array2<bool> {
        self.data
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的高.
    #[inline]
    pub fn height(&self) -> usize {
        self.shape().0
    }

    /// 图像的宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.shape().1
    }

    /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<bool> {
        self.data.get(pos).copied()
    }

    /// 判断一个索引是否合法 (未越界).
    #[inline]
    pub fn check(&self, (h, w): Idx2d) -> bool {
        let (h_len, w_len) = self.shape();
        h < h_len && w < w_len
    }

    /// 判断一个索引是否位于图像的边缘.
    #[inline]
    pub fn is_at_border(&self, (h, w): Idx2d) -> bool {
        h == 0
            || h.saturating_add(1) == self.height()
            || w == 0
            || w.saturating_add(1) == self.width()
    }

    /// 前景像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// 该图是否为全背景图?
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 获得 `pos` 的 4-邻域像素索引. 保证返回的索引都不越界.
    pub fn n4_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
        super::neighbour4(pos)
            .into_iter()
            .filter(|p| self.check(*p))
            .collect()
    }

    /// 获得 `pos` 的 8-邻域像素索引. 保证返回的索引都不越界.
    pub fn n8_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
        super::neighbour8(pos)
            .into_iter()
            .filter(|p| self.check(*p))
            .collect()
    }

    /// 以行优先规则, 获取能迭代图像所有索引的迭代器.
    #[inline]
    pub fn pos_iter(&self) -> PosIter {
        PosIter::new(self.shape())
    }

    /// 以行优先规则, 获取能迭代所有前景索引的迭代器.
    #[inline]
    pub fn foreground(&self) -> impl Iterator<Item = Idx2d> + '_ {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &pix)| pix.then_some(pos))
    }

    /// 按照给定连通规则获取所有值为 `value` 的区域.
    ///
    /// 区域以行优先顺序被发现, 每个区域内部按 BFS 顺序排列.
    /// 两个像素 `p1` 和 `p2` 属于同一个区域, 当且仅当存在一条从 `p1` 到
    /// `p2` 的相邻路径, 且路径上的所有像素都等于 `value`.
    pub fn areas(&self, connectivity: Connectivity, value: bool) -> Areas2d {
        let mut ans = Areas2d::with_capacity(1);
        let mut bfs_q = VecDeque::with_capacity(4);
        let mut set = HashSet::with_capacity(16);

        for pos in self.pos_iter() {
            if set.contains(&pos) || self[pos] != value {
                continue;
            }
            set.insert(pos);
            bfs_q.push_back(pos);
            let mut this_area = Area2d::with_capacity(1);
            while let Some(cur) = bfs_q.pop_front() {
                this_area.push(cur);
                for next in connectivity.neighbours(cur) {
                    if self.get(next) == Some(value) && set.insert(next) {
                        bfs_q.push_back(next);
                    }
                }
            }
            ans.push(this_area);
        }
        ans
    }

    /// 将图像中的背景空洞 (即不与图像边缘 4-相连的背景区域)
    /// 填充为前景. 如果以此法修改了原图则返回 `true`, 否则返回 `false`.
    pub fn fill_holes(&mut self) -> bool {
        let mut modified = false;
        for area in self.areas(Connectivity::Four, false) {
            if area.iter().all(|p| !self.is_at_border(*p)) {
                area.into_iter().for_each(|p| self[p] = true);
                modified = true;
            }
        }
        modified
    }
}
