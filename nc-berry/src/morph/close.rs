use crate::data::neighbour8;
use crate::BinaryMask;

/// 以 3x3 方形结构元素做一次闭运算 (先膨胀后腐蚀).
///
/// 膨胀时图像外视为背景; 腐蚀时图像外视为前景 (补齐边缘),
/// 因此贴边的目标不会被图像边框腐蚀掉.
pub fn close_padded(mask: &BinaryMask) -> BinaryMask {
    let shape = mask.shape();
    let dilated = BinaryMask::from_fn(shape, |pos| {
        mask[pos]
            || neighbour8(pos)
                .into_iter()
                .any(|n| mask.get(n) == Some(true))
    });
    BinaryMask::from_fn(shape, |pos| {
        dilated[pos]
            && neighbour8(pos)
                .into_iter()
                .all(|n| dilated.get(n) != Some(false))
    })
}
