use super::Rect;
use crate::Idx2d;

/// 行优先索引迭代器.
///
/// 虽然如下函数也能实现相同的功能:
///
/// ```
/// type Idx2d = (usize, usize);
///
/// fn pos_iter_auto((h, w): Idx2d) -> impl Iterator<Item = Idx2d> {
///     (0..h).flat_map(move |first| (0..w).map(move |second| (first, second)))
/// }
///
/// // ...
/// ```
///
/// 但经测试, 该迭代器对象占用的空间更大. 因此为性能考虑, 我们保留该结构.
/// 它既可以遍历整幅图像, 也可以只遍历图像中的一个矩形区域.
#[derive(Debug, Clone)]
pub struct PosIter {
    cur_h: usize,
    cur_w: usize,
    rect: Rect,
}

impl PosIter {
    /// 遍历分辨率为 `shape` 的整幅图像.
    #[inline]
    pub fn new(shape: Idx2d) -> Self {
        Self::within(Rect::from_shape(shape))
    }

    /// 只遍历 `rect` 覆盖的部分.
    #[inline]
    pub fn within(rect: Rect) -> Self {
        Self {
            cur_h: rect.top(),
            cur_w: rect.left(),
            rect,
        }
    }
}

impl Iterator for PosIter {
    type Item = Idx2d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rect.is_empty() || self.cur_h == self.rect.bottom() {
            return None;
        }
        let ret_pos = (self.cur_h, self.cur_w);
        if self.cur_w + 1 == self.rect.right() {
            self.cur_w = self.rect.left();
            self.cur_h += 1;
        } else {
            self.cur_w += 1;
        }
        Some(ret_pos)
    }
}

/// 该测试已足够覆盖所有情况, 不用变更.
#[cfg(test)]
mod completeness_tests {
    use super::PosIter;
    use crate::{Idx2d, Rect};

    fn pos_iter_builtin((top, left): Idx2d, (h, w): Idx2d) -> impl Iterator<Item = Idx2d> {
        (top..top + h).flat_map(move |first| (left..left + w).map(move |second| (first, second)))
    }

    #[test]
    fn test_builtin_iter_size_larger() {
        use std::mem::size_of_val as sizeof;

        let tup = (1, 1);
        assert!(sizeof(&pos_iter_builtin((0, 0), tup)) > sizeof(&PosIter::new(tup)));
    }

    #[test]
    fn test_pos_iter() {
        for i in 0..=4 {
            for j in 0..=4 {
                let tup = (i, j);
                assert!(Iterator::eq(pos_iter_builtin((0, 0), tup), PosIter::new(tup)));
            }
        }
    }

    #[test]
    fn test_pos_iter_within() {
        for top in 0..=2 {
            for left in 0..=2 {
                for h in 0..=3 {
                    for w in 0..=3 {
                        let rect = Rect::new(top, left, h, w);
                        assert!(Iterator::eq(
                            pos_iter_builtin((top, left), (h, w)),
                            PosIter::within(rect)
                        ));
                    }
                }
            }
        }
    }
}
