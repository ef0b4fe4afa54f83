//! 数据集操作.
//!
//! 每个拍摄位点存为一个 `.npz` 文件, 内含 `c1.npy`, `c2.npy`, ... 等二维数组,
//! 分别对应通道 1, 2, .... 分析核心本身不做任何 I/O.

use std::path::{Path, PathBuf};

mod loader;
mod npz_stack;

pub use loader::{stack_loader, StackLoader};
pub use npz_stack::{read_stack, ReadStackError};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_dataset_dir_with() {
        if let Some(base) = home_dataset_dir() {
            let p = home_dataset_dir_with(["plate1", "A1.npz"]).unwrap();
            assert_eq!(p, base.join("plate1").join("A1.npz"));
        }
    }
}
