//! 评估结果与落盘.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use skel_berry::pipeline::PipelineReport;

use crate::EvalError;

/// 指标名到标量值的映射.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    data: BTreeMap<String, f64>,
}

impl Metrics {
    /// 创建空映射.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个指标.
    #[inline]
    pub fn insert(&mut self, name: &str, value: f64) {
        self.data.insert(name.to_string(), value);
    }

    /// 按指标名查询.
    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.data.get(name).copied()
    }

    /// 将映射以 JSON 对象写入 `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), EvalError> {
        let file = File::create(path.as_ref()).map_err(EvalError::IoError)?;
        serde_json::to_writer(file, &self.data).map_err(EvalError::WriteResult)
    }
}

/// 一次评估运行的汇总: 流水线报告与最终 ERL.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// 对应流水线报告.
    pub pipeline: PipelineReport,

    /// 期望延伸长度.
    pub erl: f64,
}

/// 将 `report` 的结果写进 `w` 中.
pub fn describe_into<W: Write>(name: &str, report: &EvalReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Evaluation `{name}`:")?;
    writeln!(
        w,
        "{S4}Background annotations: {}",
        report.pipeline.background_nodes
    )?;
    writeln!(
        w,
        "{S4}Annotations outside of ROI: {}",
        report.pipeline.removed_nodes
    )?;
    writeln!(
        w,
        "{S4}Skeleton clusters: {}",
        report.pipeline.components
    )?;
    write!(w, "{S4}Expected run-length: {:.6}", report.erl)?;
    Ok(())
}
