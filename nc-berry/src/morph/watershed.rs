//! 欧氏距离图上的分水岭切分.

use crate::data::neighbour8;
use crate::{BinaryMask, Idx2d};
use binary_heap_plus::BinaryHeap;
use ndarray::Array2;
use std::f64::consts::SQRT_2;

/// 前景像素到最近背景像素的 (倒角近似) 欧氏距离. 背景像素为 0.
///
/// 两遍扫描, 直邻权重 1, 斜邻权重 `√2`. 图像外视为背景.
pub fn distance_map(mask: &BinaryMask) -> Array2<f64> {
    let (h_len, w_len) = mask.shape();
    let mut d = mask.array_view().mapv(|p| if p { f64::INFINITY } else { 0.0 });
    let at = |d: &Array2<f64>, h: usize, w: usize, dh: isize, dw: isize| -> f64 {
        match (h.checked_add_signed(dh), w.checked_add_signed(dw)) {
            (Some(nh), Some(nw)) if nh < h_len && nw < w_len => d[(nh, nw)],
            _ => 0.0,
        }
    };

    for h in 0..h_len {
        for w in 0..w_len {
            if d[(h, w)] > 0.0 {
                let v = d[(h, w)]
                    .min(at(&d, h, w, -1, 0) + 1.0)
                    .min(at(&d, h, w, 0, -1) + 1.0)
                    .min(at(&d, h, w, -1, -1) + SQRT_2)
                    .min(at(&d, h, w, -1, 1) + SQRT_2);
                d[(h, w)] = v;
            }
        }
    }
    for h in (0..h_len).rev() {
        for w in (0..w_len).rev() {
            if d[(h, w)] > 0.0 {
                let v = d[(h, w)]
                    .min(at(&d, h, w, 1, 0) + 1.0)
                    .min(at(&d, h, w, 0, 1) + 1.0)
                    .min(at(&d, h, w, 1, 1) + SQRT_2)
                    .min(at(&d, h, w, 1, -1) + SQRT_2);
                d[(h, w)] = v;
            }
        }
    }
    d
}

/// 带峰值高度的并查集. 每个集合是一个盆地.
struct Basins {
    parent: Vec<usize>,
    peak: Vec<f64>,
}

impl Basins {
    fn new() -> Self {
        Self {
            parent: Vec::new(),
            peak: Vec::new(),
        }
    }

    fn open(&mut self, peak: f64) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.peak.push(peak);
        id
    }

    fn find(&mut self, mut a: usize) -> usize {
        while self.parent[a] != a {
            self.parent[a] = self.parent[self.parent[a]];
            a = self.parent[a];
        }
        a
    }

    /// 合并 `roots` 中的全部盆地, 峰值最高者为新根.
    fn merge(&mut self, roots: &[usize]) -> usize {
        let top = roots
            .iter()
            .copied()
            .reduce(|a, b| if self.peak[b] > self.peak[a] { b } else { a })
            .unwrap_or(roots[0]);
        for &r in roots {
            self.parent[r] = top;
        }
        top
    }
}

/// 在距离图上从高到低淹没前景, 切开粘连的目标.
///
/// 像素按距离从大到小处理 (距离相同时按行优先). 新像素的 8-邻域中:
///
/// 1. 没有已标记像素: 开辟一个新盆地, 峰值为该像素的距离;
/// 2. 只有一个盆地: 并入该盆地;
/// 3. 有多个盆地: 若至少两个盆地的峰值比当前距离高出 `tolerance`,
///   则该像素成为分割线 (置为背景), 否则合并这些盆地.
///
/// # 返回值
///
/// 新的二值图像. 不同盆地的像素互不 8-相邻, 因此切分结果在
/// 4-连通意义下一定是分离的.
pub fn watershed_split(mask: &BinaryMask, tolerance: f64) -> BinaryMask {
    let edm = distance_map(mask);
    let mut heap = BinaryHeap::new_by(|a: &Idx2d, b: &Idx2d| {
        edm[*a].total_cmp(&edm[*b]).then_with(|| b.cmp(a))
    });
    heap.extend(mask.foreground());

    const UNLABELED: usize = usize::MAX;
    let mut label = Array2::from_elem(mask.shape(), UNLABELED);
    let mut basins = Basins::new();
    let mut out = mask.clone();
    let mut lines = 0usize;
    let mut roots = Vec::with_capacity(8);

    while let Some(pos) = heap.pop() {
        let level = edm[pos];
        roots.clear();
        for n in neighbour8(pos) {
            if let Some(&id) = label.get(n) {
                if id != UNLABELED {
                    roots.push(basins.find(id));
                }
            }
        }
        roots.sort_unstable();
        roots.dedup();

        match roots.len() {
            0 => label[pos] = basins.open(level),
            1 => label[pos] = roots[0],
            _ => {
                let significant = roots
                    .iter()
                    .filter(|&&r| basins.peak[r] - level >= tolerance)
                    .count();
                if significant >= 2 {
                    out[pos] = false;
                    lines += 1;
                } else {
                    label[pos] = basins.merge(&roots);
                }
            }
        }
    }
    if lines > 0 {
        log::trace!("分水岭: {} 个盆地, {} 个分割线像素", basins.parent.len(), lines);
    }
    out
}
