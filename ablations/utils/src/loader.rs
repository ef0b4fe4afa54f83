//! 对 `nc-berry::dataset` 的更一层封装. 提供更直接的数据集加载器.

use nc_berry::dataset::{self, StackLoader};
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// 获取位点文件所在目录.
///
/// 1. 若环境变量 `$NC_STACK_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/stacks`;
/// 3. 无法确定用户主目录时返回 `None`.
pub fn stack_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("NC_STACK_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(["stacks"]),
    }
}

/// 获取位点加载器. 标定取自 [`crate::calibration_from_env`].
pub fn stack_loader<P: AsRef<Path>>(path: P) -> io::Result<StackLoader> {
    dataset::stack_loader(path, crate::calibration_from_env())
}
