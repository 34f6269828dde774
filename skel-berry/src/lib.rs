#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供神经元骨架标注 (ground truth) 与 3D 分割预测体数据的结构化信息,
//! 以及期望延伸长度 (Expected Run-Length, ERL) 评估所需的骨架-分割对应流水线.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 负责从原始骨架标注图与稠密分割预测体出发, 产出经过 ROI 过滤、
//!    连通分量归并的带标签骨架图. ERL 统计量本身由外部评估器完成
//!    (见 [`erl::RunLengthEvaluator`]), 这里不重新实现.
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 流水线
//!
//! 数据单向流动, 分四个阶段, 由 [`pipeline::run`] 按序驱动:
//!
//! 1. **坐标重排**: 将每个节点标注序 `(x, y, z)` 的物理坐标重排为体数据
//!    索引序 `(z, y, x)`. 实现位于 `skel-berry/src/pipeline/resolve.rs`.
//! 2. **标签解析**: 在重排坐标处查询分割预测体, 记录 `seg_label`;
//!    越界或背景节点被标记为 ROI 之外. 每个节点得到一个显式三态结果,
//!    不使用错误机制表达这种高频、预期内的情况.
//! 3. **ROI 过滤**: 整批移除所有被标记的节点及其关联边. 标记与移除严格分两趟,
//!    不在迭代中变更节点集.
//! 4. **骨架身份归并**: 对过滤后的无向图求连通分量, 为每个分量分配规范索引
//!    `skeleton_index`. 被 ROI 边界截断的同一神经元片段由此获得一致的身份,
//!    而不依赖标注源的 `skeleton_id`. 实现位于
//!    `skel-berry/src/pipeline/consolidate.rs`.
//!
//! 分割体数据在全程是只读的; 骨架图被原地变更, 流水线结束后交给外部评估器,
//! 不再复用.

/// 三维索引, 同时也可一定程度上用作非负整数向量. 按 `(z, y, x)` 顺序.
pub type Idx3d = (usize, usize, usize);

/// 三维物理坐标 / 向量, 以纳米为单位. 轴序视上下文为标注序 (x, y, z)
/// 或体数据序 (z, y, x).
pub type Coord3 = [i64; 3];

pub mod consts;

/// npz 读取小工具.
mod npz;

/// 3D 分割预测体数据基础结构.
mod volume;

pub use volume::{DownsamplePolicy, OpenVolumeError, Roi, SegmentVolume, VolumeGeometryError};

/// 骨架标注图基础结构.
mod skeleton;

pub use skeleton::{LoadSkeletonError, SkeletonGraph, SkeletonNode};

pub mod erl;
pub mod pipeline;
pub mod prelude;
