//! 骨架-分割对应流水线编排.
//!
//! 四个阶段对一张骨架图与一个只读分割体严格串行执行:
//! 坐标重排 → 标签解析 → ROI 过滤 → 骨架身份归并.
//! 标记与移除分两趟完成, 绝不在迭代节点集的同时变更它.

mod consolidate;
mod resolve;

pub use consolidate::assign_skeleton_indexes;
pub use resolve::{reconcile, resolve, NodeResolution};

use std::collections::BTreeMap;

use log::info;

use crate::{SegmentVolume, SkeletonGraph};

/// 一次流水线运行的报告.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PipelineReport {
    /// 解析到背景标签的节点个数 (诊断用).
    pub background_nodes: usize,

    /// 被 ROI 过滤移除的节点个数, 含背景与越界两类.
    pub removed_nodes: usize,

    /// 归并后的连通分量个数.
    pub components: u64,

    /// 分量索引到代表 `skeleton_id` 的映射 (诊断用).
    pub index_to_skeleton_id: BTreeMap<u64, u64>,
}

/// 按序执行完整流水线, 原地变更骨架图 `graph`; `volume` 全程只读.
///
/// ROI 之外的节点在此局部恢复: 移除、计数, 不构成整次运行的失败.
/// 过滤后为空的图是合法终态, 归并返回零个分量, 由调用方决定
/// 零骨架的评分语义. 本函数不重试, 单趟完成.
pub fn run(graph: &mut SkeletonGraph, volume: &SegmentVolume) -> PipelineReport {
    let (outside, background_nodes) = resolve::tag_nodes(graph, volume);
    let removed_nodes = graph.remove_batch(&outside);
    info!("Removing {removed_nodes} GT annotations outside of evaluated ROI");
    info!("{background_nodes} annotations resolved to the background label");

    let (components, index_to_skeleton_id) = consolidate::assign_skeleton_indexes(graph);
    info!("{components} skeleton clusters after consolidation");

    PipelineReport {
        background_nodes,
        removed_nodes,
        components,
        index_to_skeleton_id,
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::{SegmentVolume, SkeletonGraph};
    use ndarray::{array, Array2, Array3};
    use std::collections::BTreeSet;

    /// 4x4x4、体素尺寸 1、起点 0 的体数据, 默认整体填充标签 7.
    fn uniform_volume(label: u64) -> SegmentVolume {
        let data = Array3::<u64>::from_elem((4, 4, 4), label);
        SegmentVolume::from_parts(data, [0; 3], [1, 1, 1]).unwrap()
    }

    fn node_ids(g: &SkeletonGraph) -> BTreeSet<u64> {
        g.nodes().map(|n| n.id).collect()
    }

    /// 场景 A: 3 节点路径, 全部解析到标签 7.
    #[test]
    fn test_scenario_path_in_roi() {
        let _ = simple_logger::SimpleLogger::new().init();

        let vol = uniform_volume(7);
        let nodes = array![
            [1i64, 5, 0, 1, 2],
            [2, 5, 1, 1, 2],
            [3, 5, 2, 1, 2],
        ];
        let edges = array![[1.0f64, 2.0, 1.0], [2.0, 3.0, 1.0]];
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        let report = run(&mut g, &vol);
        assert_eq!(report.removed_nodes, 0);
        assert_eq!(report.background_nodes, 0);
        assert_eq!(report.components, 1);
        assert_eq!(report.index_to_skeleton_id[&0], 5);

        for n in g.nodes() {
            assert_eq!(n.seg_label, Some(7));
            assert_eq!(n.skeleton_index, Some(0));
            // 重排坐标是 position 的轴序反转.
            let p = n.position;
            assert_eq!(n.zyx_coord, Some([p[2], p[1], p[0]]));
        }
    }

    /// 场景 B: 一条边 + 两个孤立节点, 其中一个孤立节点解析到背景.
    #[test]
    fn test_scenario_background_isolated() {
        let mut data = Array3::<u64>::from_elem((4, 4, 4), 7);
        data[(3, 3, 3)] = 0;
        let vol = SegmentVolume::from_parts(data, [0; 3], [1, 1, 1]).unwrap();

        let nodes = array![
            [1i64, 5, 0, 0, 0],
            [2, 5, 1, 0, 0],
            [3, 6, 2, 2, 2],
            [4, 6, 3, 3, 3], // 背景体素.
        ];
        let edges = array![[1.0f64, 2.0, 1.0]];
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        let report = run(&mut g, &vol);
        assert_eq!(report.removed_nodes, 1);
        assert_eq!(report.background_nodes, 1);
        assert_eq!(report.components, 2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(node_ids(&g), BTreeSet::from([1, 2, 3]));
    }

    /// 场景 C: 越界孤立节点与背景节点同等对待 (移除并计数).
    #[test]
    fn test_scenario_out_of_bounds() {
        let vol = uniform_volume(7);
        let nodes = array![[1i64, 5, 0, 0, 0], [2, 5, 0, 0, 9]];
        let edges = Array2::<f64>::zeros((0, 0));
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        let report = run(&mut g, &vol);
        assert_eq!(report.removed_nodes, 1);
        assert_eq!(report.background_nodes, 0);
        assert_eq!(report.components, 1);
        assert_eq!(node_ids(&g), BTreeSet::from([1]));
    }

    /// 过滤单调: 节点集合只减不增; 全部滤除时得到合法的空终态.
    #[test]
    fn test_filter_monotonic_and_empty_terminal() {
        let vol = uniform_volume(0); // 全背景.
        let nodes = array![[1i64, 5, 0, 0, 0], [2, 5, 1, 0, 0]];
        let edges = array![[1.0f64, 2.0, 1.0]];
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        let before = node_ids(&g);
        let report = run(&mut g, &vol);
        let after = node_ids(&g);

        assert!(after.is_subset(&before));
        assert_eq!(report.removed_nodes, 2);
        assert_eq!(report.background_nodes, 2);
        assert_eq!(report.components, 0);
        assert!(g.is_empty());
        assert!(report.index_to_skeleton_id.is_empty());
    }

    /// 标签一致性: 过滤后每个节点的 `seg_label` 非零,
    /// 且等于体数据在其重排坐标处的取值.
    #[test]
    fn test_label_consistency() {
        let mut data = Array3::<u64>::from_elem((4, 4, 4), 7);
        data[(2, 1, 0)] = 9;
        data[(0, 0, 0)] = 0;
        let vol = SegmentVolume::from_parts(data, [0; 3], [1, 1, 1]).unwrap();

        let nodes = array![
            [1i64, 5, 0, 0, 0], // 背景, 将被移除.
            [2, 5, 0, 1, 2],    // 标签 9.
            [3, 5, 1, 1, 2],    // 标签 7.
        ];
        let edges = array![[2.0f64, 3.0, 1.0]];
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        run(&mut g, &vol);
        for n in g.nodes() {
            let label = n.seg_label.unwrap();
            assert_ne!(label, 0);
            assert_eq!(vol.label_at(&n.zyx_coord.unwrap()), Some(label));
        }
        assert_eq!(g.node(g.index_of(2).unwrap()).seg_label, Some(9));
    }

    /// `skeleton_index` 只取决于过滤后的拓扑, 与 `seg_label` 无关:
    /// 同一分量跨越不同分割对象时仍共享一个索引.
    #[test]
    fn test_index_independent_of_labels() {
        let mut data = Array3::<u64>::from_elem((4, 4, 4), 7);
        data[(0, 0, 1)] = 8;
        let vol = SegmentVolume::from_parts(data, [0; 3], [1, 1, 1]).unwrap();

        let nodes = array![[1i64, 5, 0, 0, 0], [2, 5, 1, 0, 0]];
        let edges = array![[1.0f64, 2.0, 1.0]];
        let mut g = SkeletonGraph::from_arrays(nodes.view(), edges.view()).unwrap();

        let report = run(&mut g, &vol);
        assert_eq!(report.components, 1);

        let a = g.node(g.index_of(1).unwrap());
        let b = g.node(g.index_of(2).unwrap());
        assert_ne!(a.seg_label, b.seg_label);
        assert_eq!(a.skeleton_index, b.skeleton_index);
    }
}
