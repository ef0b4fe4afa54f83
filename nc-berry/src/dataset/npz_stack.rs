use crate::{Calibration, GrayscaleBuffer, ImageStack};
use ndarray::{Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// 读取位点文件错误.
#[derive(Error, Debug)]
pub enum ReadStackError {
    /// 底层 I/O 错误.
    #[error("无法打开位点文件: {0}")]
    Io(#[from] std::io::Error),

    /// npz 格式错误.
    #[error("npz 读取失败: {0}")]
    Npz(#[from] ReadNpzError),

    /// 文件中没有任何 `c{n}.npy` 数组.
    #[error("位点文件不含任何通道")]
    NoChannels,

    /// 通道编号不连续.
    #[error("缺少通道 {0}")]
    MissingChannel(usize),

    /// 样本类型既不是 `u16` 也不是 `u8`.
    #[error("通道 `{0}` 的样本类型不受支持")]
    UnsupportedDtype(String),
}

/// 由数组名解析通道编号: `c2.npy` 或 `c2` 为通道 2.
fn channel_number(name: &str) -> Option<usize> {
    let stem = name.strip_suffix(".npy").unwrap_or(name);
    stem.strip_prefix('c')?.parse().ok().filter(|&n| n > 0)
}

/// 依次尝试 `u16` 与 `u8` 样本.
fn read_channel(
    npz: &mut NpzReader<File>,
    name: &str,
    cal: &Calibration,
) -> Result<GrayscaleBuffer, ReadStackError> {
    match npz.by_name::<OwnedRepr<u16>, Ix2>(name) {
        Ok(arr) => return Ok(GrayscaleBuffer::new(arr, cal.clone())),
        Err(ReadNpzError::Npy(_)) => {}
        Err(e) => return Err(e.into()),
    }
    match npz.by_name::<OwnedRepr<u8>, Ix2>(name) {
        Ok(arr) => Ok(GrayscaleBuffer::new(arr, cal.clone())),
        Err(ReadNpzError::Npy(_)) => Err(ReadStackError::UnsupportedDtype(name.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// 读取一个位点的全部通道. 位点名为文件名去掉扩展名.
///
/// 所有通道共享同一物理标定 `calibration`.
///
/// # 注意
///
/// 通道编号必须从 1 开始连续, 否则返回 [`ReadStackError::MissingChannel`].
pub fn read_stack<P: AsRef<Path>>(path: P, calibration: &Calibration) -> Result<ImageStack, ReadStackError> {
    let path = path.as_ref();
    let mut npz = NpzReader::new(File::open(path)?)?;

    let mut names: Vec<(usize, String)> = npz
        .names()?
        .into_iter()
        .filter_map(|name| channel_number(&name).map(|n| (n, name)))
        .collect();
    if names.is_empty() {
        return Err(ReadStackError::NoChannels);
    }
    names.sort_unstable();

    let mut channels = Vec::with_capacity(names.len());
    for (expected, (n, name)) in (1..).zip(names) {
        if n != expected {
            return Err(ReadStackError::MissingChannel(expected));
        }
        channels.push(read_channel(&mut npz, &name, calibration)?);
    }

    let position = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::debug!("读取位点 `{position}`: {} 个通道", channels.len());
    Ok(ImageStack::new(position, channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelDepth;
    use ndarray::Array2;
    use ndarray_npy::NpzWriter;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nc-berry-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_channel_number() {
        assert_eq!(channel_number("c1.npy"), Some(1));
        assert_eq!(channel_number("c12"), Some(12));
        assert_eq!(channel_number("c0.npy"), None);
        assert_eq!(channel_number("mask.npy"), None);
    }

    #[test]
    fn test_read_stack() {
        let path = temp_path("B3.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("c2", &Array2::<u8>::from_elem((3, 4), 7)).unwrap();
        npz.add_array("c1", &Array2::<u16>::from_elem((3, 4), 700)).unwrap();
        npz.add_array("notes", &Array2::<u8>::zeros((1, 1))).unwrap();
        npz.finish().unwrap();

        let cal = Calibration::isotropic(0.5, "µm").unwrap();
        let stack = read_stack(&path, &cal).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(stack.position, "B3");
        assert_eq!(stack.len(), 2);
        let c1 = stack.channel(1).unwrap();
        assert_eq!(c1.depth(), PixelDepth::U16);
        assert_eq!(c1.get((2, 3)), Some(700.0));
        assert_eq!(c1.calibration(), &cal);
        assert_eq!(stack.channel(2).unwrap().depth(), PixelDepth::U8);
    }

    #[test]
    fn test_missing_channel() {
        let path = temp_path("C1.npz");
        let mut npz = NpzWriter::new(File::create(&path).unwrap());
        npz.add_array("c1", &Array2::<u16>::zeros((2, 2))).unwrap();
        npz.add_array("c3", &Array2::<u16>::zeros((2, 2))).unwrap();
        npz.finish().unwrap();

        let err = read_stack(&path, &Calibration::default()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ReadStackError::MissingChannel(2)));
    }

    #[test]
    fn test_missing_file() {
        let err = read_stack(temp_path("nope.npz"), &Calibration::default()).unwrap_err();
        assert!(matches!(err, ReadStackError::Io(_)));
    }
}
