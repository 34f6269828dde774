//! 坐标重排与标签解析 (流水线第一、二阶段), 以及 ROI 过滤的标记趟.

use petgraph::stable_graph::NodeIndex;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::consts::seg;
use crate::{Coord3, SegmentVolume, SkeletonGraph};

/// 单个节点坐标的标签解析结果.
///
/// 显式三态: ROI 之外是高频、预期内的情况, 不用错误机制表达.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeResolution {
    /// 坐标落在体数据可寻址范围内, 且标签非背景.
    Resolved(u64),

    /// 坐标超出体数据可寻址范围.
    OutOfBounds,

    /// 坐标处的预测标签为背景 (0).
    Background,
}

impl NodeResolution {
    /// 该结果是否意味着节点位于评估 ROI 之外?
    #[inline]
    pub const fn is_out_of_roi(&self) -> bool {
        !matches!(self, Self::Resolved(_))
    }
}

/// 将标注序 (x, y, z) 的坐标重排为体数据序 (z, y, x).
///
/// 纯函数, 无失败模式; 连续应用两次返回原坐标.
#[inline]
pub const fn reconcile(p: &Coord3) -> Coord3 {
    [p[2], p[1], p[0]]
}

/// 解析体数据 `vol` 在物理坐标 `zyx` 处的标签.
///
/// 只读查询, 结果仅由坐标与体数据内容决定.
#[inline]
pub fn resolve(vol: &SegmentVolume, zyx: &Coord3) -> NodeResolution {
    match vol.label_at(zyx) {
        None => NodeResolution::OutOfBounds,
        Some(seg::BACKGROUND) => NodeResolution::Background,
        Some(label) => NodeResolution::Resolved(label),
    }
}

/// 标记趟: 为每个节点写入 `zyx_coord` 与 `seg_label`,
/// 并收集位于 ROI 之外的节点. 不移除任何节点.
///
/// 返回 (待移除节点集合, 解析到背景标签的节点个数). 集合按图的节点枚举
/// 顺序排列, 与解析是否并行无关, 最终赋值对固定输入可复现.
pub(crate) fn tag_nodes(
    graph: &mut SkeletonGraph,
    vol: &SegmentVolume,
) -> (Vec<NodeIndex>, usize) {
    let resolved = resolve_all(graph, vol);

    let mut outside = Vec::new();
    let mut bg_nodes = 0usize;
    for (idx, zyx, res) in resolved {
        let node = graph.node_mut(idx);
        node.zyx_coord = Some(zyx);
        match res {
            NodeResolution::Resolved(label) => node.seg_label = Some(label),
            NodeResolution::Background => {
                node.seg_label = Some(seg::BACKGROUND);
                bg_nodes += 1;
                outside.push(idx);
            }
            NodeResolution::OutOfBounds => outside.push(idx),
        }
    }
    (outside, bg_nodes)
}

/// 解析全部节点. 对图与体数据均只读; 节点两两独立, 可安全并行.
fn resolve_all(
    graph: &SkeletonGraph,
    vol: &SegmentVolume,
) -> Vec<(NodeIndex, Coord3, NodeResolution)> {
    let positions: Vec<(NodeIndex, Coord3)> = graph
        .node_indices()
        .map(|idx| (idx, graph.node(idx).position))
        .collect();

    let eval = |(idx, pos): (NodeIndex, Coord3)| {
        let zyx = reconcile(&pos);
        (idx, zyx, resolve(vol, &zyx))
    };

    #[cfg(feature = "rayon")]
    {
        positions.into_par_iter().map(eval).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        positions.into_iter().map(eval).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, resolve, NodeResolution};
    use crate::SegmentVolume;
    use ndarray::Array3;

    /// 轴序重排是对合的: 应用两次回到原坐标.
    #[test]
    fn test_reconcile_involutive() {
        for p in [[0i64, 1, 2], [7, 7, 7], [-3, 0, 12]] {
            assert_eq!(reconcile(&p), [p[2], p[1], p[0]]);
            assert_eq!(reconcile(&reconcile(&p)), p);
        }
    }

    #[test]
    fn test_resolve_tri_state() {
        let mut data = Array3::<u64>::zeros((2, 2, 2));
        data[(1, 0, 1)] = 7;
        let vol = SegmentVolume::from_parts(data, [0; 3], [1, 1, 1]).unwrap();

        assert_eq!(resolve(&vol, &[1, 0, 1]), NodeResolution::Resolved(7));
        assert_eq!(resolve(&vol, &[0, 0, 0]), NodeResolution::Background);
        assert_eq!(resolve(&vol, &[2, 0, 0]), NodeResolution::OutOfBounds);
        assert_eq!(resolve(&vol, &[-1, 0, 0]), NodeResolution::OutOfBounds);

        assert!(!NodeResolution::Resolved(7).is_out_of_roi());
        assert!(NodeResolution::Background.is_out_of_roi());
        assert!(NodeResolution::OutOfBounds.is_out_of_roi());
    }
}
