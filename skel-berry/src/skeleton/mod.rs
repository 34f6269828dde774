use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};

use crate::Coord3;

mod load;

pub use load::LoadSkeletonError;

/// 骨架图节点, 对应被追踪神经元中心线上的一个标注点.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    /// 标注源节点 id. 外部评估器查表用的键.
    pub id: u64,

    /// 标注源骨架身份. 经 ROI 裁剪后不保证空间连续,
    /// 因此不直接用作神经元身份.
    pub skeleton_id: u64,

    /// 标注序 (x, y, z) 的物理坐标.
    pub position: Coord3,

    /// 重排为体数据序 (z, y, x) 的物理坐标. 由流水线第一阶段写入.
    pub zyx_coord: Option<Coord3>,

    /// 该坐标处的分割预测标签. 由流水线第二阶段写入;
    /// 坐标越界的节点保持 `None`.
    pub seg_label: Option<u64>,

    /// 规范簇索引. 同一连通分量内恒定, 跨分量互异.
    /// 由流水线第四阶段写入.
    pub skeleton_index: Option<u64>,
}

impl SkeletonNode {
    /// 由标注源属性创建节点. 派生属性留待流水线填充.
    #[inline]
    pub const fn new(id: u64, skeleton_id: u64, position: Coord3) -> Self {
        Self {
            id,
            skeleton_id,
            position,
            zyx_coord: None,
            seg_label: None,
            skeleton_index: None,
        }
    }
}

/// 骨架标注图. 无向; 节点携带标注属性, 边携带物理长度 (`edge_length`).
///
/// 底层采用稳定索引的图存储: ROI 过滤会移除节点,
/// 其余节点的索引必须保持有效.
#[derive(Debug, Clone)]
pub struct SkeletonGraph {
    graph: StableUnGraph<SkeletonNode, f64>,
    index_of: HashMap<u64, NodeIndex>,
}

impl Default for SkeletonGraph {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletonGraph {
    /// 创建空图.
    #[inline]
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::with_capacity(0, 0),
            index_of: HashMap::new(),
        }
    }

    /// 节点个数.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// 边条数.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// 图是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// 添加节点, 返回其图索引.
    ///
    /// 若 `node.id` 已存在则 panic; 调用方需保证 id 唯一
    /// (反序列化入口将重复 id 报告为错误).
    pub fn add_node(&mut self, node: SkeletonNode) -> NodeIndex {
        let id = node.id;
        assert!(
            !self.index_of.contains_key(&id),
            "duplicate skeleton node id {id}"
        );
        let idx = self.graph.add_node(node);
        self.index_of.insert(id, idx);
        idx
    }

    /// 在节点 id `u` 与 `v` 之间添加一条物理长度为 `edge_length` 的边.
    ///
    /// `edge_length` 一经写入不再变更. 若任一端点 id 不存在则 panic.
    pub fn add_edge(&mut self, u: u64, v: u64, edge_length: f64) -> EdgeIndex {
        let ui = self.index_of[&u];
        let vi = self.index_of[&v];
        self.graph.add_edge(ui, vi, edge_length)
    }

    /// 由节点 id 查询图索引.
    #[inline]
    pub fn index_of(&self, id: u64) -> Option<NodeIndex> {
        self.index_of.get(&id).copied()
    }

    /// 获取 `idx` 处的节点. 若节点不存在 (已被移除) 则 panic.
    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &SkeletonNode {
        &self.graph[idx]
    }

    /// 获取 `idx` 处的可变节点. 若节点不存在 (已被移除) 则 panic.
    #[inline]
    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut SkeletonNode {
        &mut self.graph[idx]
    }

    /// 按确定顺序迭代当前所有节点的图索引.
    #[inline]
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// 迭代当前所有节点.
    #[inline]
    pub fn nodes(&self) -> impl Iterator<Item = &SkeletonNode> {
        self.graph.node_weights()
    }

    /// 迭代 `idx` 的邻接节点.
    #[inline]
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// 查询节点 id `u` 与 `v` 之间边的物理长度. 无此边时返回 `None`.
    pub fn edge_length(&self, u: u64, v: u64) -> Option<f64> {
        let ui = self.index_of(u)?;
        let vi = self.index_of(v)?;
        let e = self.graph.find_edge(ui, vi)?;
        self.graph.edge_weight(e).copied()
    }

    /// 整批移除 `indices` 指向的节点及其全部关联边, 返回实际移除个数.
    ///
    /// 这是 "先标记、后移除" 两趟过程的第二趟: 调用方必须先收集完整的
    /// 待移除集合, 再一次性调用本方法, 不得在遍历节点的同时移除.
    /// 被移除的节点不可恢复.
    pub fn remove_batch(&mut self, indices: &[NodeIndex]) -> usize {
        let mut removed = 0;
        for &idx in indices {
            if let Some(node) = self.graph.remove_node(idx) {
                self.index_of.remove(&node.id);
                removed += 1;
            }
        }
        removed
    }

    /// 获得底层 petgraph 图的不可变引用, 供外部评估器遍历.
    #[inline]
    pub fn as_graph(&self) -> &StableUnGraph<SkeletonNode, f64> {
        &self.graph
    }
}
