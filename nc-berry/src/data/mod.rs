use crate::Idx2d;
use ndarray::{s, Array2};
use num::traits::AsPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod calibration;
mod cluster;
pub(crate) mod iter;
mod mask;
mod rect;
mod save;

pub use calibration::Calibration;
pub use cluster::PixelCluster;
pub use mask::BinaryMask;
pub use rect::Rect;
pub use save::{ClusterOverlay, ImgWriteVis};

/// 样本位深.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelDepth {
    /// 8 位无符号.
    U8,
    /// 16 位无符号. 显微相机最常见的格式.
    U16,
    /// 32 位无符号.
    U32,
    /// 8 位有符号.
    I8,
    /// 16 位有符号.
    I16,
    /// 32 位有符号.
    I32,
}

impl PixelDepth {
    /// 每个样本的位数.
    pub const fn bits(self) -> u32 {
        match self {
            PixelDepth::U8 | PixelDepth::I8 => 8,
            PixelDepth::U16 | PixelDepth::I16 => 16,
            PixelDepth::U32 | PixelDepth::I32 => 32,
        }
    }
}

/// 带位深标记的行优先二维样本.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Samples {
    /// 8 位无符号样本.
    U8(Array2<u8>),
    /// 16 位无符号样本.
    U16(Array2<u16>),
    /// 32 位无符号样本.
    U32(Array2<u32>),
    /// 8 位有符号样本.
    I8(Array2<i8>),
    /// 16 位有符号样本.
    I16(Array2<i16>),
    /// 32 位有符号样本.
    I32(Array2<i32>),
}

/// 对每种位深执行同一段表达式, 返回表达式本身的值.
macro_rules! for_each_depth {
    ($samples: expr, $arr: ident => $body: expr) => {
        match $samples {
            Samples::U8($arr) => $body,
            Samples::U16($arr) => $body,
            Samples::U32($arr) => $body,
            Samples::I8($arr) => $body,
            Samples::I16($arr) => $body,
            Samples::I32($arr) => $body,
        }
    };
}

/// 对每种位深执行同一段表达式, 并以原位深重新包装结果.
macro_rules! map_depth {
    ($samples: expr, $arr: ident => $body: expr) => {
        match $samples {
            Samples::U8($arr) => Samples::U8($body),
            Samples::U16($arr) => Samples::U16($body),
            Samples::U32($arr) => Samples::U32($body),
            Samples::I8($arr) => Samples::I8($body),
            Samples::I16($arr) => Samples::I16($body),
            Samples::I32($arr) => Samples::I32($body),
        }
    };
}

macro_rules! impl_from_array {
    ($($elem: ty => $variant: ident),+) => {
        $(
            impl From<Array2<$elem>> for Samples {
                #[inline]
                fn from(value: Array2<$elem>) -> Self {
                    Samples::$variant(value)
                }
            }
        )+
    };
}

impl_from_array!(u8 => U8, u16 => U16, u32 => U32, i8 => I8, i16 => I16, i32 => I32);

/// 将任意整数样本扩展为 `f64`. 所有支持的位深都能被 `f64` 精确表示.
#[inline]
fn widen<T: AsPrimitive<f64>>(arr: &Array2<T>) -> Array2<f64> {
    arr.mapv(|v| v.as_())
}

impl Samples {
    /// 分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        for_each_depth!(self, arr => arr.dim())
    }

    /// 样本位深.
    pub fn depth(&self) -> PixelDepth {
        match self {
            Samples::U8(_) => PixelDepth::U8,
            Samples::U16(_) => PixelDepth::U16,
            Samples::U32(_) => PixelDepth::U32,
            Samples::I8(_) => PixelDepth::I8,
            Samples::I16(_) => PixelDepth::I16,
            Samples::I32(_) => PixelDepth::I32,
        }
    }

    /// 获取给定位置 (高, 宽) 的样本值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<f64> {
        for_each_depth!(self, arr => arr.get(pos).map(|&v| v.as_()))
    }

    /// 深拷贝为 `f64` 数组.
    #[inline]
    pub fn to_f64(&self) -> Array2<f64> {
        for_each_depth!(self, arr => widen(arr))
    }

    /// 最小值与最大值. 空图像返回 `None`.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        for_each_depth!(self, arr => {
            let min = arr.iter().copied().min()?;
            let max = arr.iter().copied().max()?;
            Some((min.as_(), max.as_()))
        })
    }

    /// 裁剪出 `rect` 范围内的样本 (深拷贝).
    ///
    /// # 注意
    ///
    /// 调用方负责保证 `rect` 位于图像范围内, 否则程序 panic.
    pub fn crop(&self, rect: Rect) -> Samples {
        let (top, left) = rect.origin();
        let (bottom, right) = (rect.bottom(), rect.right());
        map_depth!(self, arr => arr.slice(s![top..bottom, left..right]).to_owned())
    }

    /// 返回一份副本, 其中 `rect` 与图像相交的部分被填充为整幅图像的最小样本值.
    pub fn with_region_cleared(&self, rect: Rect) -> Samples {
        let Some(rect) = rect.intersect(&Rect::from_shape(self.shape())) else {
            return self.clone();
        };
        let (top, left) = rect.origin();
        let (bottom, right) = (rect.bottom(), rect.right());
        map_depth!(self, arr => {
            let mut out = arr.clone();
            if let Some(&min) = arr.iter().min() {
                out.slice_mut(s![top..bottom, left..right]).fill(min);
            }
            out
        })
    }
}

/// 单通道灰度图像: 样本 + 物理标定.
///
/// 构造后不可变. 所有 "修改" 都以返回新对象的方式进行.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrayscaleBuffer {
    samples: Samples,
    calibration: Calibration,
}

impl GrayscaleBuffer {
    /// 直接初始化.
    #[inline]
    pub fn new<S: Into<Samples>>(samples: S, calibration: Calibration) -> Self {
        Self {
            samples: samples.into(),
            calibration,
        }
    }

    /// 以 "1 像素 = 1 单位" 的标定初始化.
    #[inline]
    pub fn uncalibrated<S: Into<Samples>>(samples: S) -> Self {
        Self::new(samples, Calibration::default())
    }

    /// 底层样本.
    #[inline]
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// 物理标定.
    #[inline]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// 样本位深.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.samples.depth()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.samples.shape()
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

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 判断一个索引是否合法 (未越界).
    #[inline]
    pub fn check(&self, (h, w): Idx2d) -> bool {
        let (h_len, w_len) = self.shape();
        h < h_len && w < w_len
    }

    /// 获取给定位置 (高, 宽) 的样本值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<f64> {
        self.samples.get(pos)
    }

    /// 深拷贝为 `f64` 数组, 供滤波等算法使用.
    #[inline]
    pub fn to_f64(&self) -> Array2<f64> {
        self.samples.to_f64()
    }

    /// 最小值与最大值. 空图像返回 `None`.
    #[inline]
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.samples.min_max()
    }

    /// 均值与样本标准差 (分母 `n - 1`). 空图像返回 `None`.
    pub fn mean_std_dev(&self) -> Option<(f64, f64)> {
        let values = self.to_f64();
        let n = values.len();
        if n == 0 {
            return None;
        }
        let mean = values.sum() / n as f64;
        if n == 1 {
            return Some((mean, 0.0));
        }
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some((mean, var.sqrt()))
    }

    /// 裁剪出 `rect` 范围内的图像, 标定不变.
    ///
    /// # 注意
    ///
    /// 调用方负责保证 `rect.fits_in(self.shape())`, 否则程序 panic.
    #[inline]
    pub fn crop(&self, rect: Rect) -> GrayscaleBuffer {
        Self::new(self.samples.crop(rect), self.calibration.clone())
    }

    /// 将 `rect` 范围填充为最小样本值后的新图像.
    #[inline]
    pub fn with_region_cleared(&self, rect: Rect) -> GrayscaleBuffer {
        Self::new(self.samples.with_region_cleared(rect), self.calibration.clone())
    }
}

/// 同一拍摄位点的所有通道.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageStack {
    /// 位点名称, 一般取文件名.
    pub position: String,

    /// 各通道图像, 第 `i` 个元素对应通道 `i + 1`.
    pub channels: Vec<GrayscaleBuffer>,
}

impl ImageStack {
    /// 直接初始化.
    #[inline]
    pub fn new<S: Into<String>>(position: S, channels: Vec<GrayscaleBuffer>) -> Self {
        Self {
            position: position.into(),
            channels,
        }
    }

    /// 获取通道 `channel` (从 1 开始计数).
    #[inline]
    pub fn channel(&self, channel: usize) -> Option<&GrayscaleBuffer> {
        self.channels.get(channel.checked_sub(1)?)
    }

    /// 通道个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// 是否不含任何通道.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}
