/// 创建按钮失败的原因。失败时不会留下任何半初始化的实例。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateError {
    /// 没有提供定时器池。
    MissingTimerPool,
    /// 扫描周期为零。
    InvalidScanPeriod,
    /// 按钮池已满。
    CapacityExceeded,
}

/// 处理输入事件失败的原因。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// 定时器池暂时为空，按钮状态保持不变。
    TimerUnavailable,
    /// 句柄不属于该键盘。
    UnknownButton,
}

impl NotifyError {
    /// 在下一个扫描周期重新投递同一事件是否可能成功。
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotifyError::TimerUnavailable)
    }
}
