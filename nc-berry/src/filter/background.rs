//! 背景扣除: 滚动抛物面 (默认) 与滚球.
//!
//! 两者都以灰度开运算估计背景. 暗目标先取反, 做完后再取反回来,
//! 相当于用闭运算估计背景.

use super::{fill_rows, BackgroundModel, Polarity};
use crate::Idx2d;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1};

/// 抛物面曲率系数: 偏离顶点 `d` 像素时下降 `0.5 * d² / radius`.
const PARABOLOID_CURVATURE: f64 = 0.5;

/// 球面结构元素中的一个偏移量.
#[derive(Copy, Clone, Debug)]
struct BallOffset {
    dh: isize,
    dw: isize,
    height: f64,
}

/// 半径为 `radius` 的球面结构元素: 所有满足 `dh² + dw² <= r²` 的整数偏移,
/// 高度为 `sqrt(r² - dh² - dw²)`.
fn ball(radius: f64) -> Vec<BallOffset> {
    let r2 = radius * radius;
    let reach = radius.floor() as isize;
    let mut ans = Vec::with_capacity(((2 * reach + 1) * (2 * reach + 1)) as usize);
    for dh in -reach..=reach {
        for dw in -reach..=reach {
            let d2 = (dh * dh + dw * dw) as f64;
            if d2 <= r2 {
                ans.push(BallOffset {
                    dh,
                    dw,
                    height: (r2 - d2).sqrt(),
                });
            }
        }
    }
    ans
}

/// `(h, w)` 加上偏移后的索引. 越界时返回 `None`.
#[inline]
fn shifted((h, w): Idx2d, b: &BallOffset, (h_len, w_len): Idx2d) -> Option<Idx2d> {
    let nh = h.checked_add_signed(b.dh)?;
    let nw = w.checked_add_signed(b.dw)?;
    (nh < h_len && nw < w_len).then_some((nh, nw))
}

/// 灰度腐蚀: `min(src(x + b) - height(b))`, 只考虑图像内的偏移.
fn ball_erode(src: ArrayView2<f64>, ball: &[BallOffset]) -> Array2<f64> {
    let shape = src.dim();
    let mut out = Array2::zeros(shape);
    fill_rows(&mut out, |h, mut row| {
        for (w, v) in row.iter_mut().enumerate() {
            *v = ball
                .iter()
                .filter_map(|b| shifted((h, w), b, shape).map(|p| src[p] - b.height))
                .fold(f64::INFINITY, f64::min);
        }
    });
    out
}

/// 灰度膨胀: `max(src(x + b) + height(b))`, 只考虑图像内的偏移.
fn ball_dilate(src: ArrayView2<f64>, ball: &[BallOffset]) -> Array2<f64> {
    let shape = src.dim();
    let mut out = Array2::zeros(shape);
    fill_rows(&mut out, |h, mut row| {
        for (w, v) in row.iter_mut().enumerate() {
            *v = ball
                .iter()
                .filter_map(|b| shifted((h, w), b, shape).map(|p| src[p] + b.height))
                .fold(f64::NEG_INFINITY, f64::max);
        }
    });
    out
}

fn ball_open(img: ArrayView2<f64>, radius: f64) -> Array2<f64> {
    let ball = ball(radius);
    ball_dilate(ball_erode(img, &ball).view(), &ball)
}

/// 一维抛物线下包络: `out[p] = min_q (f[q] + c * (p - q)²)`.
///
/// 逐个加入抛物线并维护下包络 (Felzenszwalb-Huttenlocher), 线性时间.
fn lower_envelope(f: ArrayView1<f64>, c: f64, mut out: ArrayViewMut1<f64>) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let key = |q: usize| f[q] + c * (q * q) as f64;
    // `q > p` 时, 两条抛物线交点的横坐标.
    let cross = |q: usize, p: usize| (key(q) - key(p)) / (2.0 * c * (q - p) as f64);

    let mut apex = vec![0usize; n];
    let mut bound = vec![0.0; n + 1];
    bound[0] = f64::NEG_INFINITY;
    bound[1] = f64::INFINITY;
    let mut k = 0;
    for q in 1..n {
        let mut s = cross(q, apex[k]);
        while s <= bound[k] {
            k -= 1;
            s = cross(q, apex[k]);
        }
        k += 1;
        apex[k] = q;
        bound[k] = s;
        bound[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (p, v) in out.iter_mut().enumerate() {
        while bound[k + 1] < p as f64 {
            k += 1;
        }
        let d = p.abs_diff(apex[k]) as f64;
        *v = f[apex[k]] + c * d * d;
    }
}

fn envelope_rows(src: ArrayView2<f64>, c: f64) -> Array2<f64> {
    let mut out = Array2::zeros(src.dim());
    fill_rows(&mut out, |h, row| lower_envelope(src.row(h), c, row));
    out
}

/// 以抛物面为结构函数的灰度腐蚀. `d² = dh² + dw²`, 因此可以先横向, 后纵向.
fn paraboloid_erode(src: ArrayView2<f64>, c: f64) -> Array2<f64> {
    let rows = envelope_rows(src, c);
    envelope_rows(rows.t(), c).reversed_axes()
}

fn paraboloid_open(img: ArrayView2<f64>, radius: f64) -> Array2<f64> {
    let c = PARABOLOID_CURVATURE / radius;
    let eroded = paraboloid_erode(img, c);
    // 膨胀即对取反后的图像腐蚀再取反.
    let mut out = paraboloid_erode(eroded.mapv(|v| -v).view(), c);
    out.mapv_inplace(|v| -v);
    out
}

/// 亮目标的背景扣除: `img - 开运算`, 浮点误差被截断为 0.
fn top_hat(img: ArrayView2<f64>, radius: f64, model: BackgroundModel) -> Array2<f64> {
    let background = match model {
        BackgroundModel::SlidingParaboloid => paraboloid_open(img, radius),
        BackgroundModel::RollingBall => ball_open(img, radius),
    };
    let mut out = &img - &background;
    out.mapv_inplace(|v| v.max(0.0));
    out
}

/// 以半径为 `radius` 的抛物面或球从目标的另一侧估计背景并扣除.
///
/// 扣除后背景约为 0. 亮目标的结果非负; 暗目标的结果非正,
/// 越暗的目标值越小, 因此阈值化时仍按原来的亮暗规则取前景.
/// 半径不是正数时原样返回.
///
/// # 注意
///
/// 球的高度不超过 `radius` 个强度单位, 尺寸明显大于球的平坦目标,
/// 其内部会被当作背景扣除, 只留下边缘. 抛物面的曲率为 `0.5 / radius`,
/// 在强度差较大时不会伸入目标内部.
pub fn subtract_background(
    img: ArrayView2<f64>,
    radius: f64,
    model: BackgroundModel,
    polarity: Polarity,
) -> Array2<f64> {
    if !(radius > 0.0) || img.is_empty() {
        return img.to_owned();
    }
    match polarity {
        Polarity::BrightObjects => top_hat(img, radius, model),
        Polarity::DarkObjects => {
            let mut out = top_hat(img.mapv(|v| -v).view(), radius, model);
            out.mapv_inplace(|v| -v);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth;
    use ndarray::Array1;

    const BRIGHT: Polarity = Polarity::BrightObjects;
    const BALL: BackgroundModel = BackgroundModel::RollingBall;
    const PARABOLOID: BackgroundModel = BackgroundModel::SlidingParaboloid;

    fn disk_f64(inside: u16, outside: u16) -> Array2<f64> {
        synth::disks((100, 100), &[((50, 50), 10.0)], inside, outside).mapv(f64::from)
    }

    #[test]
    fn test_ball_shape() {
        let b = ball(1.0);
        assert_eq!(b.len(), 5);
        let center = b.iter().find(|o| o.dh == 0 && o.dw == 0).unwrap();
        assert!(synth::f64_eq(center.height, 1.0, 1e-12));
        assert_eq!(ball(5.0).len(), 81);
    }

    #[test]
    fn test_lower_envelope() {
        let f = Array1::from(vec![5.0, 0.0, 9.0, 9.0, 1.0]);
        let mut out = Array1::zeros(5);
        lower_envelope(f.view(), 1.0, out.view_mut());
        assert_eq!(out.to_vec(), vec![1.0, 0.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_flat_image_has_no_foreground() {
        let img = Array2::from_elem((20, 20), 350.0);
        for model in [BALL, PARABOLOID] {
            let out = subtract_background(img.view(), 5.0, model, BRIGHT);
            assert!(out.iter().all(|v| v.abs() < 1e-9));
        }
    }

    #[test]
    fn test_small_spot_is_kept() {
        let mut img = Array2::from_elem((30, 30), 100.0);
        img[(15, 15)] = 500.0;
        let out = subtract_background(img.view(), 5.0, BALL, BRIGHT);
        // 球顶被亮点抬高了 5 - sqrt(24).
        assert!(synth::f64_eq(out[(15, 15)], 395.0 + 24f64.sqrt(), 1e-9));
        assert!(out[(0, 0)].abs() < 1e-9);
    }

    #[test]
    fn test_linear_ramp_is_removed() {
        let img = Array2::from_shape_fn((24, 24), |(_, w)| 50.0 + w as f64);
        for model in [BALL, PARABOLOID] {
            let out = subtract_background(img.view(), 4.0, model, BRIGHT);
            assert!(out.iter().all(|v| *v >= 0.0));
            // 远离边缘的位置, 斜面被完整扣除.
            assert!(out[(12, 12)].abs() < 1e-9);
        }
    }

    /// 半径 5 的抛物面无法伸入半径 10 的平台, 球则会把平台内部扣光.
    #[test]
    fn test_paraboloid_keeps_large_plateau() {
        let img = disk_f64(1000, 100);
        let out = subtract_background(img.view(), 5.0, PARABOLOID, BRIGHT);
        assert!(out[(50, 50)] > 880.0);
        assert!(out[(50, 59)] > 880.0);
        assert!(out[(0, 0)].abs() < 1e-9);
        assert!(out[(50, 61)].abs() < 1e-9);

        let out = subtract_background(img.view(), 5.0, BALL, BRIGHT);
        assert!(out[(50, 50)] < 1.0);
    }

    #[test]
    fn test_dark_objects_use_closing() {
        let bright = subtract_background(disk_f64(1000, 100).view(), 5.0, PARABOLOID, BRIGHT);
        let dark = subtract_background(
            disk_f64(100, 1000).view(),
            5.0,
            PARABOLOID,
            Polarity::DarkObjects,
        );
        assert!(dark.iter().all(|v| *v <= 0.0));
        assert!(dark[(50, 50)] < -880.0);
        assert!(dark[(0, 0)].abs() < 1e-9);
        // 亮暗互换后, 扣除结果只差一个符号.
        assert!(bright
            .iter()
            .zip(dark.iter())
            .all(|(b, d)| synth::f64_eq(*b, -*d, 1e-6)));
    }

    #[test]
    fn test_non_positive_radius_is_identity() {
        let img = Array2::from_shape_fn((4, 4), |(h, w)| (h + w) as f64);
        assert_eq!(subtract_background(img.view(), 0.0, PARABOLOID, BRIGHT), img);
    }
}
