//! 期望延伸长度 (ERL) 评估器边界.
//!
//! ERL 统计量是归并骨架图之上的外部数值算法, 本 crate 不重新实现;
//! 这里只约定其输入契约: 一张满足流水线不变量的骨架图, 以及节点 id 到
//! `seg_label` 的查找表. 分量身份取自节点的 `skeleton_index`,
//! 空间位置取自 `zyx_coord`, 边长取自边权 (`edge_length`).

use std::collections::HashMap;

use crate::SkeletonGraph;

/// 节点 id 到分割预测标签的查找表.
pub type NodeSegmentLut = HashMap<u64, u64>;

/// 由过滤后的骨架图构建节点 id 到 `seg_label` 的查找表.
///
/// 过滤后的每个节点都已写入 `seg_label`; 若存在未解析节点
/// (即流水线没有先运行), 则 panic.
pub fn segment_lut(graph: &SkeletonGraph) -> NodeSegmentLut {
    graph
        .nodes()
        .map(|n| {
            // 流水线已为每个幸存节点写入标签.
            (n.id, n.seg_label.unwrap())
        })
        .collect()
}

/// 期望延伸长度评估器.
///
/// 消费归并后的骨架图与查找表, 返回标量 ERL. 合并/分裂统计默认关闭,
/// 不属于该契约. 对零骨架输入的语义由调用方定义, 实现不会收到空图
/// (见 harness 层的约定).
pub trait RunLengthEvaluator {
    /// 计算期望延伸长度.
    fn expected_run_length(&self, skeletons: &SkeletonGraph, node_segment_lut: &NodeSegmentLut)
        -> f64;
}
