//! 骨架身份归并 (流水线第四阶段).

use std::collections::{BTreeMap, VecDeque};

use petgraph::stable_graph::NodeIndex;

use crate::SkeletonGraph;

/// 对 (过滤后的) 无向图求连通分量, 为每个分量内的所有节点写入规范簇索引
/// `skeleton_index`, 并记录每个分量的代表 `skeleton_id` 以供诊断.
///
/// 被 ROI 边界截断或标注本身不连续的同一神经元片段, 由此获得一个只取决于
/// 当前图拓扑的身份, 与 `seg_label` 和标注源 `skeleton_id` 都无关.
///
/// 索引按分量枚举顺序取 `0..k`. 枚举顺序本身没有语义, 但对固定的图是
/// 确定的, 同一次运行内可复现; 对相同拓扑重复调用得到相同划分.
/// 孤立节点构成单元素分量; 空图得到零个分量, 不是错误.
///
/// 返回 (分量个数, 分量索引到代表 `skeleton_id` 的映射).
pub fn assign_skeleton_indexes(graph: &mut SkeletonGraph) -> (u64, BTreeMap<u64, u64>) {
    // 重复调用时覆盖旧划分.
    let order: Vec<NodeIndex> = graph.node_indices().collect();
    for &idx in &order {
        graph.node_mut(idx).skeleton_index = None;
    }

    let mut index_to_id = BTreeMap::new();
    let mut next = 0u64;
    let mut queue = VecDeque::new();

    for start in order {
        if graph.node(start).skeleton_index.is_some() {
            continue;
        }
        index_to_id.insert(next, graph.node(start).skeleton_id);

        graph.node_mut(start).skeleton_index = Some(next);
        queue.push_back(start);
        while let Some(cur) = queue.pop_front() {
            let neigh: Vec<NodeIndex> = graph.neighbors(cur).collect();
            for n in neigh {
                let node = graph.node_mut(n);
                if node.skeleton_index.is_none() {
                    node.skeleton_index = Some(next);
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }
    (next, index_to_id)
}
