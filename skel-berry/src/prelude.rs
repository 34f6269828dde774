//! 常用功能一站式导入.

pub use crate::{Coord3, Idx3d};

pub use crate::consts::seg;
pub use crate::erl::{segment_lut, NodeSegmentLut, RunLengthEvaluator};
pub use crate::pipeline::{self, NodeResolution, PipelineReport};
pub use crate::{
    DownsamplePolicy, LoadSkeletonError, OpenVolumeError, Roi, SegmentVolume, SkeletonGraph,
    SkeletonNode,
};
