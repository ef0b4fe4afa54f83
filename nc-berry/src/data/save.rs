//! 图像的持久化存储.

use super::{BinaryMask, GrayscaleBuffer, PixelCluster};
use crate::consts::gray::*;
use image::{GrayImage, ImageResult, Luma};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好"
/// 的方式保存, 而不是 "as is" 的方式. 这意味着, 二值图像会映射为黑白两色,
/// 高位深的显微图像会按其自身强度范围线性拉伸到 8 位.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 将强度线性拉伸到 `[0, 255]`. 平坦图像全部映射为黑色.
pub(crate) fn stretch(buffer: &GrayscaleBuffer) -> GrayImage {
    let (height, width) = buffer.shape();
    let mut buf = GrayImage::new(width as u32, height as u32);
    let Some((min, max)) = buffer.min_max() else {
        return buf;
    };
    let span = max - min;
    for ((h, w), &v) in buffer.to_f64().indexed_iter() {
        let gray = if span > 0.0 {
            ((v - min) / span * WHITE as f64).round() as u8
        } else {
            BLACK
        };
        buf.put_pixel(w as u32, h as u32, Luma([gray]));
    }
    buf
}

/// 前景为白色, 背景为黑色.
impl ImgWriteVis for BinaryMask {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.array_view().indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([if pix { WHITE } else { BLACK }]));
        }
        buf.save(path)
    }
}

/// 按自身强度范围线性拉伸.
impl ImgWriteVis for GrayscaleBuffer {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        stretch(self).save(path)
    }
}

/// 细胞核与胞质环的叠加图.
///
/// 在拉伸后的背景图上, 细胞核像素提亮 [`NUCLEUS_OVERLAY`],
/// 胞质环像素提亮 [`CYTOPLASM_OVERLAY`] (饱和加法). 越界的坐标被忽略.
pub struct ClusterOverlay<'a> {
    background: &'a GrayscaleBuffer,
    nuclei: &'a [PixelCluster],
    cytoplasms: &'a [PixelCluster],
}

impl<'a> ClusterOverlay<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(
        background: &'a GrayscaleBuffer,
        nuclei: &'a [PixelCluster],
        cytoplasms: &'a [PixelCluster],
    ) -> Self {
        Self {
            background,
            nuclei,
            cytoplasms,
        }
    }

    /// 渲染为 8 位灰度图.
    pub fn render(&self) -> GrayImage {
        let mut buf = stretch(self.background);
        let layers = [
            (self.nuclei, NUCLEUS_OVERLAY),
            (self.cytoplasms, CYTOPLASM_OVERLAY),
        ];
        let (height, width) = self.background.shape();
        for (clusters, delta) in layers {
            for (h, w) in clusters.iter().flat_map(PixelCluster::iter) {
                if h < height && w < width {
                    let pix = buf.get_pixel_mut(w as u32, h as u32);
                    pix.0[0] = pix.0[0].saturating_add(delta);
                }
            }
        }
        buf
    }
}

impl ImgWriteVis for ClusterOverlay<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.render().save(path)
    }
}
