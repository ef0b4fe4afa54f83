#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素的物理尺寸.
///
/// 面积过滤等以物理单位描述的参数通过它换算为像素.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    pixel_width: f64,
    pixel_height: f64,
    unit: String,
}

impl Default for Calibration {
    /// 1 像素 = 1 单位.
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            unit: String::from("pixel"),
        }
    }
}

impl Calibration {
    /// 初始化. 当像素宽或高不是正有限数时返回 `None`.
    pub fn new<S: Into<String>>(pixel_width: f64, pixel_height: f64, unit: S) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(pixel_width) && valid(pixel_height)).then(|| Self {
            pixel_width,
            pixel_height,
            unit: unit.into(),
        })
    }

    /// 正方形像素.
    #[inline]
    pub fn isotropic<S: Into<String>>(pixel_size: f64, unit: S) -> Option<Self> {
        Self::new(pixel_size, pixel_size, unit)
    }

    /// 像素宽.
    #[inline]
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// 像素高.
    #[inline]
    pub fn pixel_height(&self) -> f64 {
        self.pixel_height
    }

    /// 长度单位.
    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// 单个像素的面积.
    #[inline]
    pub fn pixel_area(&self) -> f64 {
        self.pixel_width * self.pixel_height
    }
}

#[cfg(test)]
mod tests {
    use super::Calibration;

    #[test]
    fn test_invalid_sizes() {
        assert!(Calibration::new(0.0, 1.0, "um").is_none());
        assert!(Calibration::new(1.0, -1.0, "um").is_none());
        assert!(Calibration::isotropic(f64::NAN, "um").is_none());
        assert!(Calibration::isotropic(f64::INFINITY, "um").is_none());
    }

    #[test]
    fn test_pixel_area() {
        let cal = Calibration::new(0.5, 0.25, "um").unwrap();
        assert_eq!(cal.unit(), "um");
        assert!((cal.pixel_area() - 0.125).abs() < 1e-15);
        assert_eq!(Calibration::default().pixel_area(), 1.0);
    }
}
