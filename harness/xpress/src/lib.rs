//! XPRESS 评估入口. 对 `skel-berry` 流水线的更一层封装:
//! 显式配置、数据载入、条件降采样、外部评估器调用与结果落盘.
//!
//! 不存在进程级默认路径或其他全局状态: 一次运行的全部输入输出位置与
//! 几何参数都由 [`EvalConfig`] 显式给出, 构造后传入 [`evaluate`].

use std::env;
use std::path::PathBuf;

use log::info;
use skel_berry::erl::{segment_lut, RunLengthEvaluator};
use skel_berry::{pipeline, Coord3, DownsamplePolicy, SegmentVolume, SkeletonGraph};
use skel_berry::{LoadSkeletonError, OpenVolumeError};

mod result;

pub use result::{describe_into, EvalReport, Metrics};

/// 结果映射中 ERL 指标的键名.
pub const ERL_METRIC: &str = "Expected run-length";

/// 评估运行错误.
#[derive(Debug)]
pub enum EvalError {
    /// 打开分割预测体错误.
    OpenVolume(OpenVolumeError),

    /// 读取骨架标注错误.
    LoadSkeleton(LoadSkeletonError),

    /// 结果落盘 I/O 错误.
    IoError(std::io::Error),

    /// 结果序列化错误.
    WriteResult(serde_json::Error),
}

/// 一次评估运行的完整配置.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// 分割预测 npz 文件路径.
    pub pred_path: PathBuf,

    /// 预测标签数组所在的 npz 成员名.
    pub pred_member: String,

    /// 骨架标注 npz 文件路径.
    pub skeleton_path: PathBuf,

    /// 结果 JSON 输出路径.
    pub output_path: PathBuf,

    /// 体数据 ROI 物理起点, 按 (z, y, x) 顺序.
    pub roi_begin: Coord3,

    /// 体素物理尺寸, 按 (z, y, x) 顺序.
    pub voxel_size: Coord3,

    /// 降采样策略. `None` 表示从不降采样.
    pub downsample: Option<DownsamplePolicy>,
}

impl EvalConfig {
    /// 从环境变量构造配置.
    ///
    /// 1. `$XPRESS_PRED_FILE`, `$XPRESS_SKELETON_FILE`, `$XPRESS_OUTPUT_FILE`
    ///    必填, 任一缺失则返回 `None`;
    /// 2. `$XPRESS_PRED_MEMBER` 缺省为 `submission`;
    /// 3. ROI 起点与体素尺寸按 `z,y,x` 逗号分隔分别从 `$XPRESS_ROI_BEGIN`
    ///    与 `$XPRESS_VOXEL_SIZE` 读取, 缺省分别为 `0,0,0` 与 `1,1,1`;
    /// 4. 缺省不降采样.
    pub fn from_env() -> Option<Self> {
        let pred_path = PathBuf::from(env::var("XPRESS_PRED_FILE").ok()?);
        let skeleton_path = PathBuf::from(env::var("XPRESS_SKELETON_FILE").ok()?);
        let output_path = PathBuf::from(env::var("XPRESS_OUTPUT_FILE").ok()?);
        let pred_member =
            env::var("XPRESS_PRED_MEMBER").unwrap_or_else(|_| "submission".to_string());

        let roi_begin = match env::var("XPRESS_ROI_BEGIN") {
            Ok(s) => parse_coord(&s)?,
            Err(_) => [0; 3],
        };
        let voxel_size = match env::var("XPRESS_VOXEL_SIZE") {
            Ok(s) => parse_coord(&s)?,
            Err(_) => [1; 3],
        };

        Some(Self {
            pred_path,
            pred_member,
            skeleton_path,
            output_path,
            roi_begin,
            voxel_size,
            downsample: None,
        })
    }
}

/// 解析 `z,y,x` 形式的三元组.
fn parse_coord(s: &str) -> Option<Coord3> {
    let mut out = [0i64; 3];
    let mut parts = s.split(',');
    for v in out.iter_mut() {
        *v = parts.next()?.trim().parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

/// 实际运行: 载入分割预测体与骨架标注, 执行对应流水线,
/// 调用外部评估器 `evaluator`, 并将指标写入 `cfg.output_path`.
///
/// 过滤后为空的图是合法终态, 此时不调用评估器, ERL 按约定记为 `0.0`
/// 并照常落盘. 其余失败 (输入不良、落盘 I/O) 整体上抛, 不重试.
pub fn evaluate<E: RunLengthEvaluator>(
    cfg: &EvalConfig,
    evaluator: &E,
) -> Result<EvalReport, EvalError> {
    let volume = SegmentVolume::open_npz(
        &cfg.pred_path,
        &cfg.pred_member,
        cfg.roi_begin,
        cfg.voxel_size,
    )
    .map_err(EvalError::OpenVolume)?;
    let volume = match cfg.downsample {
        Some(policy) => policy.apply(volume),
        None => volume,
    };

    let mut graph = SkeletonGraph::open_npz(&cfg.skeleton_path).map_err(EvalError::LoadSkeleton)?;
    let pipeline = pipeline::run(&mut graph, &volume);

    let erl = if graph.is_empty() {
        info!("no scorable skeleton remains, ERL recorded as 0.0");
        0.0
    } else {
        let lut = segment_lut(&graph);
        evaluator.expected_run_length(&graph, &lut)
    };

    let mut metrics = Metrics::new();
    metrics.insert(ERL_METRIC, erl);
    metrics.write_json(&cfg.output_path)?;

    Ok(EvalReport { pipeline, erl })
}
