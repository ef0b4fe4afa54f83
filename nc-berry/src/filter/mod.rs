//! 阈值分割.
//!
//! 默认实现 [`OtsuThresholder`] 依次执行:
//!
//! 1. 平坦图像检查;
//! 2. 滚动抛物面 (或滚球) 背景扣除 (可关闭);
//! 3. 3x3 均值平滑 (可关闭);
//! 4. 高斯平滑;
//! 5. 256-bin Otsu 自动阈值;
//! 6. 二值化.
//!
//! 每一步都是对 `f64` 副本的纯变换, 相同输入总是得到逐位相同的输出.

use crate::consts::defaults::{BACKGROUND_RADIUS, GAUSSIAN_SIGMA, HISTOGRAM_BINS};
use crate::consts::is_flat_range;
use crate::{BinaryMask, DegenerateImage, GrayscaleBuffer};
use ndarray::{Array2, ArrayViewMut1, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod background;
mod otsu;
mod smooth;

pub use background::subtract_background;
pub use otsu::{Histogram, OtsuCut};
pub use smooth::{gaussian_blur, mean3x3};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地逐行写入 `out`.
        pub(crate) fn fill_rows<F>(out: &mut Array2<f64>, op: F)
        where
            F: Fn(usize, ArrayViewMut1<f64>) + Sync + Send,
        {
            out.axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(h, row)| op(h, row));
        }
    } else {
        /// 逐行写入 `out`.
        pub(crate) fn fill_rows<F>(out: &mut Array2<f64>, op: F)
        where
            F: Fn(usize, ArrayViewMut1<f64>),
        {
            out.axis_iter_mut(Axis(0))
                .enumerate()
                .for_each(|(h, row)| op(h, row));
        }
    }
}

/// 阈值分割器.
///
/// 流水线通过该 trait 使用阈值分割, 测试时可以替换为任意假实现.
pub trait Thresholder {
    /// 将单通道图像分割为二值图像.
    fn threshold(&self, buffer: &GrayscaleBuffer) -> Result<BinaryMask, DegenerateImage>;
}

impl<F> Thresholder for F
where
    F: Fn(&GrayscaleBuffer) -> Result<BinaryMask, DegenerateImage>,
{
    #[inline]
    fn threshold(&self, buffer: &GrayscaleBuffer) -> Result<BinaryMask, DegenerateImage> {
        self(buffer)
    }
}

/// 前景相对于背景的亮暗.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// 暗背景上的亮目标 (荧光图像). 高于阈值的像素为前景.
    #[default]
    BrightObjects,

    /// 亮背景上的暗目标. 不高于阈值的像素为前景.
    DarkObjects,
}

/// 背景估计方法.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BackgroundModel {
    /// 曲率为 `0.5 / radius` 的抛物面, 可以贴着任意大的平坦目标滑过.
    #[default]
    SlidingParaboloid,

    /// 半径为 `radius` 的球. 只适合尺寸小于球的目标.
    RollingBall,
}

/// 阈值分割参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdParams {
    /// 背景扣除半径 (像素). `None` 表示不做背景扣除.
    pub background_radius: Option<f64>,

    /// 背景估计方法.
    ///
    /// 使用 [`BackgroundModel::RollingBall`] 且半径小于目标半径时,
    /// 平坦的目标本身也会被当作背景扣除.
    pub background_model: BackgroundModel,

    /// 是否先做 3x3 均值平滑.
    pub smooth: bool,

    /// 高斯平滑的标准差 (像素). 非正数表示不做高斯平滑.
    pub gaussian_sigma: f64,

    /// 目标亮暗.
    pub polarity: Polarity,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            background_radius: Some(BACKGROUND_RADIUS),
            background_model: BackgroundModel::default(),
            smooth: true,
            gaussian_sigma: GAUSSIAN_SIGMA,
            polarity: Polarity::default(),
        }
    }
}

/// 背景扣除 + 平滑 + Otsu 的阈值分割器.
#[derive(Clone, Debug, Default)]
pub struct OtsuThresholder {
    params: ThresholdParams,
}

impl OtsuThresholder {
    /// 直接初始化.
    #[inline]
    pub fn new(params: ThresholdParams) -> Self {
        Self { params }
    }

    /// 分割参数.
    #[inline]
    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// 执行阈值化之前的全部预处理 (背景扣除与平滑), 返回新数组.
    ///
    /// 背景扣除按 [`Polarity`] 从目标的另一侧估计背景, 暗目标在结果中仍然偏暗.
    pub fn preprocess(&self, buffer: &GrayscaleBuffer) -> Array2<f64> {
        let p = &self.params;
        let mut img = buffer.to_f64();
        if let Some(radius) = p.background_radius {
            img = subtract_background(img.view(), radius, p.background_model, p.polarity);
        }
        if p.smooth {
            img = mean3x3(img.view());
        }
        if p.gaussian_sigma > 0.0 {
            img = gaussian_blur(img.view(), p.gaussian_sigma);
        }
        img
    }
}

impl Thresholder for OtsuThresholder {
    fn threshold(&self, buffer: &GrayscaleBuffer) -> Result<BinaryMask, DegenerateImage> {
        match buffer.min_max() {
            Some((min, max)) if !is_flat_range(min, max) => {}
            _ => return Err(DegenerateImage::FlatImage),
        }

        let img = self.preprocess(buffer);
        let hist = Histogram::from_values(img.view(), HISTOGRAM_BINS)
            .ok_or(DegenerateImage::NoSeparableForeground)?;
        let cut = hist.otsu_cut().ok_or(DegenerateImage::NoSeparableForeground)?;
        log::debug!(
            "Otsu 阈值: bin {} / {}, 强度 {:.3}",
            cut.level(),
            HISTOGRAM_BINS,
            cut.value()
        );

        let polarity = self.params.polarity;
        let mask = BinaryMask::from(img.mapv(|v| cut.is_foreground(hist.bin_of(v), polarity)));
        if mask.is_empty() || mask.count() == mask.height() * mask.width() {
            return Err(DegenerateImage::NoSeparableForeground);
        }
        Ok(mask)
    }
}
