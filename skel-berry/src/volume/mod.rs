use std::fs::OpenOptions;
use std::ops::Index;
use std::path::Path;

use itertools::izip;
use ndarray::{Array3, ArrayView, Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};

use crate::{npz, Coord3, Idx3d};

mod downsample;

pub use downsample::DownsamplePolicy;

/// 物理单位下的评估区域 (ROI). `begin` 与 `shape` 均按 (z, y, x)
/// 顺序, 单位与体素尺寸一致 (纳米).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roi {
    begin: Coord3,
    shape: Coord3,
}

impl Roi {
    /// 由物理起点和物理形状创建 ROI.
    #[inline]
    pub const fn new(begin: Coord3, shape: Coord3) -> Self {
        Self { begin, shape }
    }

    /// ROI 物理起点.
    #[inline]
    pub const fn begin(&self) -> Coord3 {
        self.begin
    }

    /// ROI 物理形状.
    #[inline]
    pub const fn shape(&self) -> Coord3 {
        self.shape
    }

    /// ROI 物理终点 (不含).
    #[inline]
    pub fn end(&self) -> Coord3 {
        let mut end = self.begin;
        for (e, s) in end.iter_mut().zip(self.shape) {
            *e += s;
        }
        end
    }

    /// 物理坐标 `p` (按 z, y, x 顺序) 是否落在 ROI 内?
    #[inline]
    pub fn contains(&self, p: &Coord3) -> bool {
        izip!(p, &self.begin, self.end()).all(|(&v, &b, e)| (b..e).contains(&v))
    }
}

/// 分割体数据几何校验错误.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeGeometryError {
    /// 体素尺寸存在非正分量.
    NonPositiveVoxelSize(Coord3),

    /// ROI 物理形状与 `体素形状 * 体素尺寸` 不一致.
    /// 参数分别为期望与实际的 ROI 物理形状.
    ShapeMismatch(Coord3, Coord3),
}

/// 打开分割体 npz 文件错误.
#[derive(Debug)]
pub enum OpenVolumeError {
    /// 打开 npz 文件错误.
    ReadNpzError(ReadNpzError),

    /// 其他底层 I/O 错误.
    IoError(std::io::Error),

    /// 几何校验错误.
    Geometry(VolumeGeometryError),
}

/// 稠密 3D 分割预测体. 每个体素保存一个 `u64` 预测对象标签,
/// 并携带物理 ROI 与体素尺寸. 标签 0 保留给背景 (未分配).
///
/// 在对应流水线的全程中, 该结构是只读的.
#[derive(Debug, Clone)]
pub struct SegmentVolume {
    data: Array3<u64>,
    roi: Roi,
    voxel_size: Coord3,
}

impl SegmentVolume {
    /// 由标签数据、ROI 与体素尺寸创建分割体.
    ///
    /// 要求体素尺寸各分量为正, 且 `roi.shape()` 恰为体素形状与体素尺寸的
    /// 逐分量乘积, 否则返回几何校验错误.
    pub fn new(data: Array3<u64>, roi: Roi, voxel_size: Coord3) -> Result<Self, VolumeGeometryError> {
        if voxel_size.iter().any(|&v| v <= 0) {
            return Err(VolumeGeometryError::NonPositiveVoxelSize(voxel_size));
        }
        let mut phys = [0i64; 3];
        for (p, (&n, v)) in phys.iter_mut().zip(data.shape().iter().zip(voxel_size)) {
            *p = n as i64 * v;
        }
        if phys != roi.shape() {
            return Err(VolumeGeometryError::ShapeMismatch(phys, roi.shape()));
        }
        Ok(Self { data, roi, voxel_size })
    }

    /// 由标签数据、ROI 物理起点与体素尺寸创建分割体,
    /// ROI 物理形状由体素形状与体素尺寸推导.
    pub fn from_parts(
        data: Array3<u64>,
        begin: Coord3,
        voxel_size: Coord3,
    ) -> Result<Self, VolumeGeometryError> {
        if voxel_size.iter().any(|&v| v <= 0) {
            return Err(VolumeGeometryError::NonPositiveVoxelSize(voxel_size));
        }
        let mut shape = [0i64; 3];
        for (s, (&n, v)) in shape.iter_mut().zip(data.shape().iter().zip(voxel_size)) {
            *s = n as i64 * v;
        }
        Ok(Self {
            data,
            roi: Roi::new(begin, shape),
            voxel_size,
        })
    }

    /// 打开 npz 文件中名为 `member` 的 3D `u64` 标签数组, 并按
    /// `begin` 与 `voxel_size` 赋予其物理几何. `path` 为 npz 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open_npz<P: AsRef<Path>>(
        path: P,
        member: &str,
        begin: Coord3,
        voxel_size: Coord3,
    ) -> Result<Self, OpenVolumeError> {
        let file = OpenOptions::new()
            .read(true)
            .open(path.as_ref())
            .map_err(OpenVolumeError::IoError)?;
        let mut reader = NpzReader::new(file).map_err(OpenVolumeError::ReadNpzError)?;
        let data = npz::by_member::<OwnedRepr<u64>, Ix3, _>(&mut reader, member)
            .map_err(OpenVolumeError::ReadNpzError)?;
        Self::from_parts(data, begin, voxel_size).map_err(OpenVolumeError::Geometry)
    }

    /// 物理 ROI.
    #[inline]
    pub const fn roi(&self) -> Roi {
        self.roi
    }

    /// 单个体素的物理尺寸, 按 (z, y, x) 顺序.
    #[inline]
    pub const fn voxel_size(&self) -> Coord3 {
        self.voxel_size
    }

    /// 体素形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得标签数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u64, Ix3> {
        self.data.view()
    }

    /// 查询物理坐标 `zyx` 处的预测标签.
    ///
    /// 坐标落在 ROI 内时返回 `Some(label)` (同一体素内的任意坐标都映射到
    /// 该体素, 即向下取整到体素网格); 超出 ROI 可寻址范围时返回 `None`.
    /// 该查询只读, 结果仅由坐标与体数据内容决定.
    pub fn label_at(&self, zyx: &Coord3) -> Option<u64> {
        if !self.roi.contains(zyx) {
            return None;
        }
        let begin = self.roi.begin();
        let mut vox = [0usize; 3];
        for (v, ((&p, b), s)) in vox.iter_mut().zip(zyx.iter().zip(begin).zip(self.voxel_size)) {
            *v = (p - b).div_euclid(s) as usize;
        }
        Some(self.data[(vox[0], vox[1], vox[2])])
    }
}

impl Index<Idx3d> for SegmentVolume {
    type Output = u64;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}
