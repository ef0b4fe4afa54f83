//! 消融实验依赖的通用组件.

use nc_berry::Calibration;
use std::env;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 获取像素物理尺寸.
///
/// 1. 若环境变量 `$NC_PIXEL_SIZE_UM` 是正数, 则每像素边长为该值 (µm);
/// 2. 否则, 返回未标定的 1 像素 = 1 单位.
pub fn calibration_from_env() -> Calibration {
    env::var("NC_PIXEL_SIZE_UM")
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|size| Calibration::isotropic(size, "µm"))
        .unwrap_or_default()
}
