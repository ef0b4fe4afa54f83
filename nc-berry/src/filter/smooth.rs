//! 平滑滤波. 边缘像素按复制边界处理.

use super::fill_rows;
use ndarray::{Array2, ArrayView2};

/// 将 `i + d` 截断到 `[0, len)`.
#[inline]
fn clamp_at(i: usize, d: isize, len: usize) -> usize {
    i.saturating_add_signed(d).min(len - 1)
}

/// 3x3 均值滤波.
pub fn mean3x3(img: ArrayView2<f64>) -> Array2<f64> {
    let (h_len, w_len) = img.dim();
    let mut out = Array2::zeros((h_len, w_len));
    if out.is_empty() {
        return out;
    }
    fill_rows(&mut out, |h, mut row| {
        for (w, v) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for dh in -1..=1 {
                for dw in -1..=1 {
                    sum += img[(clamp_at(h, dh, h_len), clamp_at(w, dw, w_len))];
                }
            }
            *v = sum / 9.0;
        }
    });
    out
}

/// 归一化的一维高斯核, 半径为 `ceil(3σ)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let reach = (3.0 * sigma).ceil() as isize;
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-reach..=reach)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|k| k / total).collect()
}

/// 可分离高斯滤波: 先横向, 后纵向. `sigma` 不是正数时原样返回.
pub fn gaussian_blur(img: ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    if !(sigma > 0.0) || img.is_empty() {
        return img.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let reach = (kernel.len() / 2) as isize;
    let (h_len, w_len) = img.dim();

    let mut horizontal = Array2::zeros((h_len, w_len));
    fill_rows(&mut horizontal, |h, mut row| {
        for (w, v) in row.iter_mut().enumerate() {
            *v = kernel
                .iter()
                .zip(-reach..=reach)
                .map(|(k, d)| k * img[(h, clamp_at(w, d, w_len))])
                .sum();
        }
    });

    let mut out = Array2::zeros((h_len, w_len));
    let src = horizontal.view();
    fill_rows(&mut out, |h, mut row| {
        for (w, v) in row.iter_mut().enumerate() {
            *v = kernel
                .iter()
                .zip(-reach..=reach)
                .map(|(k, d)| k * src[(clamp_at(h, d, h_len), w)])
                .sum();
        }
    });
    out
}
