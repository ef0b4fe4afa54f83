use crate::{Calibration, GrayscaleBuffer, Idx2d, PixelCluster};
use ndarray::Array2;

/// `pos` 是否落在以 `center` 为圆心, `radius` 为半径的圆盘内.
pub fn in_disk((h, w): Idx2d, (ch, cw): Idx2d, radius: f64) -> bool {
    let dh = h as f64 - ch as f64;
    let dw = w as f64 - cw as f64;
    dh * dh + dw * dw <= radius * radius
}

/// 圆盘覆盖的像素集合.
pub fn disk_cluster(center: Idx2d, radius: f64, shape: Idx2d) -> PixelCluster {
    crate::data::iter::PosIter::new(shape)
        .filter(|p| in_disk(*p, center, radius))
        .collect()
}

/// 若干个亮圆盘 (强度 `inside`) 叠加在暗背景 (强度 `outside`) 上.
pub fn disks(shape: Idx2d, disks: &[(Idx2d, f64)], inside: u16, outside: u16) -> Array2<u16> {
    Array2::from_shape_fn(shape, |pos| {
        if disks.iter().any(|&(c, r)| in_disk(pos, c, r)) {
            inside
        } else {
            outside
        }
    })
}

/// 同 [`disks`], 封装为未标定的单通道图像.
pub fn disk_buffer(shape: Idx2d, disks: &[(Idx2d, f64)], inside: u16, outside: u16) -> GrayscaleBuffer {
    GrayscaleBuffer::new(
        self::disks(shape, disks, inside, outside),
        Calibration::default(),
    )
}

/// 两通道图像: 细胞核通道与比值通道相同.
pub fn same_two_channels(buffer: GrayscaleBuffer) -> Vec<GrayscaleBuffer> {
    vec![buffer.clone(), buffer]
}

/// 近似相等.
pub fn f64_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
