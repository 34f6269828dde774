//! 骨架标注 npz 反序列化.

use std::fs::OpenOptions;
use std::path::Path;

use ndarray::{ArrayView2, Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};

use super::{SkeletonGraph, SkeletonNode};
use crate::npz;

/// 读取骨架标注图错误.
#[derive(Debug)]
pub enum LoadSkeletonError {
    /// 打开 npz 文件错误.
    ReadNpzError(ReadNpzError),

    /// 其他底层 I/O 错误.
    IoError(std::io::Error),

    /// 节点数组不是 `(n, 5)` 形状, 节点位置不构成良构三维坐标.
    /// 参数为实际列数.
    MalformedPosition(usize),

    /// 边数组不是 `(m, 3)` 形状. 参数为实际列数.
    MalformedEdge(usize),

    /// 节点 id 重复. 参数为重复的 id.
    DuplicateNode(u64),

    /// 边端点引用了不存在的节点 id. 参数为未知的 id.
    UnknownEndpoint(u64),
}

impl SkeletonGraph {
    /// 打开 npz 格式的骨架标注图. `path` 为 npz 文件的本地路径.
    ///
    /// 文件包含两个成员:
    ///
    /// - `nodes`: `(n, 5)` 的 `i64` 数组, 各列为 `id, skeleton_id, x, y, z`
    ///   (坐标为标注序物理坐标, 单位纳米);
    /// - `edges`: `(m, 3)` 的 `f64` 数组, 各列为 `u, v, edge_length`
    ///   (`u`, `v` 为节点 id, `edge_length` 为端点间物理距离).
    ///
    /// 结构性异常 (形状不良、id 重复、未知端点) 是致命错误, 不做恢复.
    pub fn open_npz<P: AsRef<Path>>(path: P) -> Result<Self, LoadSkeletonError> {
        let file = OpenOptions::new()
            .read(true)
            .open(path.as_ref())
            .map_err(LoadSkeletonError::IoError)?;
        let mut reader = NpzReader::new(file).map_err(LoadSkeletonError::ReadNpzError)?;

        let nodes = npz::by_member::<OwnedRepr<i64>, Ix2, _>(&mut reader, "nodes")
            .map_err(LoadSkeletonError::ReadNpzError)?;
        let edges = npz::by_member::<OwnedRepr<f64>, Ix2, _>(&mut reader, "edges")
            .map_err(LoadSkeletonError::ReadNpzError)?;

        Self::from_arrays(nodes.view(), edges.view())
    }

    /// 由内存中的节点/边数组构建骨架图. 数组排布与 [`SkeletonGraph::open_npz`]
    /// 的两个成员相同.
    pub fn from_arrays(
        nodes: ArrayView2<i64>,
        edges: ArrayView2<f64>,
    ) -> Result<Self, LoadSkeletonError> {
        if nodes.nrows() > 0 && nodes.ncols() != 5 {
            return Err(LoadSkeletonError::MalformedPosition(nodes.ncols()));
        }
        if edges.nrows() > 0 && edges.ncols() != 3 {
            return Err(LoadSkeletonError::MalformedEdge(edges.ncols()));
        }

        let mut graph = Self::new();
        for row in nodes.rows() {
            let id = row[0] as u64;
            if graph.index_of(id).is_some() {
                return Err(LoadSkeletonError::DuplicateNode(id));
            }
            graph.add_node(SkeletonNode::new(id, row[1] as u64, [row[2], row[3], row[4]]));
        }

        for row in edges.rows() {
            let (u, v) = (row[0] as u64, row[1] as u64);
            for id in [u, v] {
                if graph.index_of(id).is_none() {
                    return Err(LoadSkeletonError::UnknownEndpoint(id));
                }
            }
            graph.add_edge(u, v, row[2]);
        }
        Ok(graph)
    }
}
