//! npz 读取小工具.

use std::io::{Read, Seek};

use ndarray::{ArrayBase, DataOwned, Dimension};
use ndarray_npy::{NpzReader, ReadNpzError, ReadableElement};

/// 按成员名读取数组.
///
/// numpy 的 `savez` 会为成员名追加 `.npy` 后缀, 手工写入的归档则可能不追加.
/// 这里先按原名查找, 失败后再尝试带后缀的名字.
pub(crate) fn by_member<S, D, R>(
    npz: &mut NpzReader<R>,
    name: &str,
) -> Result<ArrayBase<S, D>, ReadNpzError>
where
    S: DataOwned,
    S::Elem: ReadableElement,
    D: Dimension,
    R: Read + Seek,
{
    match npz.by_name::<S, D>(name) {
        Ok(arr) => Ok(arr),
        Err(first) if !name.ends_with(".npy") => npz
            .by_name::<S, D>(&format!("{name}.npy"))
            .map_err(|_| first),
        Err(first) => Err(first),
    }
}
