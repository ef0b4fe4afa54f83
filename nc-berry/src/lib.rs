#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 在荧光显微图像上分割细胞核, 围绕每个细胞核生成一圈胞质环,
//! 并在比值通道上计算 "核平均强度 / 胞质平均强度" (核质比).
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 所有二维索引都是 `(h, w)` 即 (行, 列) 格式, 与 `ndarray` 保持一致.
//! 2. 核心流水线不做任何 I/O. 读取数据由 [`dataset`] 负责, 保存图像由
//!   [`ImgWriteVis`] 负责.
//! 3. 对数据本身的异常 (平坦图像, 无法分割的直方图, 空区域) 一律返回错误值,
//!   不会 panic.
//!
//! # 开发计划
//!
//! ### 多位深灰度图像缓冲区 ✅
//!
//! 支持 8/16/32 位有符号和无符号整数样本, 附带物理像素标定.
//!
//! 实现位于 `nc-berry/src/data`.
//!
//! ### 背景扣除 + 平滑 + Otsu 阈值分割 ✅
//!
//! 滚球法背景扣除, 3x3 均值滤波, 高斯滤波, 256-bin Otsu.
//!
//! 实现位于 `nc-berry/src/filter`.
//!
//! ### 二值形态学清理 ✅
//!
//! 带边缘补齐的闭运算, 空洞填充, 基于距离图的分水岭切分.
//!
//! 实现位于 `nc-berry/src/morph`.
//!
//! ### 轮廓提取与胞质环生成 ✅
//!
//! 1. 4-邻接区域提取, 区域内部空洞视为区域本身. ✅
//! 2. 4-邻域迭代膨胀, 先膨胀 `gap` 次得到内边界, 再膨胀 `thickness`
//!   次得到外边界, 两者之差即为胞质环. ✅
//!
//! 实现位于 `nc-berry/src/contour.rs` 与 `nc-berry/src/ring.rs`.
//!
//! ### 边缘检测钩子 ✅
//!
//! 用于跳过拍到孔板边缘的图像, 或者清除边缘区域后继续分析.
//!
//! 实现位于 `nc-berry/src/edge.rs`.
//!
//! ### 流水线协调器与运行计数 ✅
//!
//! 显式的阶段状态机, 单图纯函数分析, 可选的 rayon 批量并行.
//!
//! 实现位于 `nc-berry/src/pipeline`.
//!
//! ### 数据集读取 ✅
//!
//! 每个拍摄位点一个 `.npz` 文件, 内含 `c1.npy`, `c2.npy` ... 各通道.
//!
//! 实现位于 `nc-berry/src/dataset`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// 图像与区域的基础数据结构.
mod data;

pub use data::{
    BinaryMask, Calibration, ClusterOverlay, GrayscaleBuffer, ImageStack, ImgWriteVis,
    PixelCluster, PixelDepth, Rect, Samples,
};

pub mod consts;

pub mod error;

pub use error::{ConfigError, ConfigResult, DegenerateImage, MeasureError};

pub mod filter;

pub mod morph;

pub mod contour;

pub mod ring;

pub mod measure;

pub mod edge;

pub mod pipeline;

pub mod dataset;
pub mod prelude;

/// 测试用的合成图像.
#[cfg(test)]
pub(crate) mod synth;
