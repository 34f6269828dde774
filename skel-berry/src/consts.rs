//! 通用常量.

/// 分割标签值.
pub mod seg {
    /// 分割预测中, 背景 (未分配) 体素的标签值.
    pub const BACKGROUND: u64 = 0;

    /// 标签是否是背景?
    #[inline]
    pub const fn is_background(label: u64) -> bool {
        matches!(label, BACKGROUND)
    }

    /// 标签是否属于某个预测对象?
    #[inline]
    pub const fn is_segment(label: u64) -> bool {
        !is_background(label)
    }
}
