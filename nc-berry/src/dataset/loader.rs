//! 迭代器风格的位点加载器.

use super::{read_stack, ReadStackError};
use crate::{Calibration, ImageStack};
use std::io;
use std::path::{Path, PathBuf};

/// 按文件名顺序加载目录 `dir` 下的全部 `*.npz` 位点文件.
///
/// # 注意
///
/// 目录本身无法读取时立即返回错误; 单个文件读取失败时,
/// 加载器在迭代到该文件时返回对应的 `Err`.
pub fn stack_loader<P: AsRef<Path>>(dir: P, calibration: Calibration) -> io::Result<StackLoader> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "npz") {
            files.push(path);
        }
    }
    files.sort_unstable();
    files.reverse();
    Ok(StackLoader {
        files_rev: files,
        calibration,
    })
}

/// 位点加载器. 产出 `(位点名, 读取结果)`.
pub struct StackLoader {
    files_rev: Vec<PathBuf>,
    calibration: Calibration,
}

impl Iterator for StackLoader {
    type Item = (String, Result<ImageStack, ReadStackError>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files_rev.pop()?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some((name, read_stack(&path, &self.calibration)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.files_rev.len(), Some(self.files_rev.len()))
    }
}

impl ExactSizeIterator for StackLoader {
    #[inline]
    fn len(&self) -> usize {
        self.files_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ndarray_npy::NpzWriter;
    use std::fs::File;

    #[test]
    fn test_loader_order_and_len() {
        let dir = std::env::temp_dir().join(format!("nc-berry-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["B2", "A1", "A2"] {
            let mut npz = NpzWriter::new(File::create(dir.join(format!("{name}.npz"))).unwrap());
            npz.add_array("c1", &Array2::<u16>::zeros((2, 2))).unwrap();
            npz.finish().unwrap();
        }
        std::fs::write(dir.join("readme.txt"), "not a stack").unwrap();
        std::fs::write(dir.join("broken.npz"), "not a zip").unwrap();

        let loader = stack_loader(&dir, Calibration::default()).unwrap();
        assert_eq!(loader.len(), 4);
        let items: Vec<_> = loader.collect();
        std::fs::remove_dir_all(&dir).unwrap();

        let names: Vec<_> = items.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["A1", "A2", "B2", "broken"]);
        assert!(items[..3].iter().all(|(_, r)| r.is_ok()));
        assert!(items[3].1.is_err());
    }

    #[test]
    fn test_missing_dir() {
        assert!(stack_loader("/definitely/not/here", Calibration::default()).is_err());
    }
}
