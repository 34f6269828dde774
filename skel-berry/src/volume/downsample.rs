//! 固定步长抽取与 ROI 重对齐.

use ndarray::s;

use super::SegmentVolume;
use crate::Idx3d;

/// 显式降采样策略.
///
/// 仅当载入体数据的体素形状与 `trigger_shape` 完全一致时, 才按 `stride`
/// 在三个轴上做固定步长抽取; 其余形状原样通过. 除固定步长抽取外
/// 不做任何重采样.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DownsamplePolicy {
    /// 触发抽取的体素形状.
    pub trigger_shape: Idx3d,

    /// 三个轴共用的抽取步长.
    pub stride: usize,
}

impl DownsamplePolicy {
    /// 应用该策略. 体素形状与 `trigger_shape` 不一致时原样返回.
    pub fn apply(&self, vol: SegmentVolume) -> SegmentVolume {
        if vol.shape() == self.trigger_shape {
            vol.decimate(self.stride)
        } else {
            vol
        }
    }
}

impl SegmentVolume {
    /// 按固定步长 `stride` 在三个轴上抽取体素, 并将 ROI 重对齐到
    /// 新体素尺寸的整数倍:
    ///
    /// - 新体素尺寸为原尺寸的 `stride` 倍;
    /// - 新 ROI 起点为 `(原起点 / 新体素尺寸) * 新体素尺寸` (向下取整除法);
    /// - 新 ROI 物理形状为抽取后体素形状与新体素尺寸的逐分量乘积.
    ///
    /// 当 `stride` 为 0 时 panic.
    pub fn decimate(&self, stride: usize) -> Self {
        assert!(stride > 0, "decimation stride must be positive");

        let data = self
            .data
            .slice(s![..;stride, ..;stride, ..;stride])
            .to_owned();

        let mut ds_voxel = self.voxel_size();
        for v in ds_voxel.iter_mut() {
            *v *= stride as i64;
        }
        let mut begin = self.roi().begin();
        for (b, v) in begin.iter_mut().zip(ds_voxel) {
            *b = b.div_euclid(v) * v;
        }

        // 体素尺寸已校验为正, 该操作不会生成 `Err`, 可直接 unwrap.
        Self::from_parts(data, begin, ds_voxel).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::DownsamplePolicy;
    use crate::SegmentVolume;
    use ndarray::Array3;

    fn volume_6x6x6() -> SegmentVolume {
        let data = Array3::<u64>::from_shape_fn((6, 6, 6), |(z, y, x)| (z * 36 + y * 6 + x) as u64);
        SegmentVolume::from_parts(data, [250, 0, 100], [100, 100, 100]).unwrap()
    }

    #[test]
    fn test_decimate_realigns_roi() {
        let vol = volume_6x6x6();
        let ds = vol.decimate(3);

        assert_eq!(ds.shape(), (2, 2, 2));
        assert_eq!(ds.voxel_size(), [300, 300, 300]);
        // 250 // 300 * 300 = 0, 100 // 300 * 300 = 0.
        assert_eq!(ds.roi().begin(), [0, 0, 0]);
        assert_eq!(ds.roi().shape(), [600, 600, 600]);

        // 抽取保留原数据的 (0, 0, 0) 与 (3, 3, 3).
        assert_eq!(ds[(0, 0, 0)], 0);
        assert_eq!(ds[(1, 1, 1)], (3 * 36 + 3 * 6 + 3) as u64);
    }

    #[test]
    fn test_policy_trigger() {
        let vol = volume_6x6x6();

        let hit = DownsamplePolicy {
            trigger_shape: (6, 6, 6),
            stride: 3,
        };
        assert_eq!(hit.apply(vol.clone()).shape(), (2, 2, 2));

        let miss = DownsamplePolicy {
            trigger_shape: (7, 6, 6),
            stride: 3,
        };
        assert_eq!(miss.apply(vol).shape(), (6, 6, 6));
    }
}
