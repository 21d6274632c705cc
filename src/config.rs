use embassy_time::Duration;

/// 定义按钮消抖和按压分类的时间参数。
///
/// 所有时长都与定时器 `now()` 使用同一时钟。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// 消抖持续时间。
    ///
    /// 按下侧的抖动状态必须稳定超过这个时长，才会确认一次 `Pressed` 事件。
    pub debounce: Duration,

    /// 确认按下后，继续保持超过这个时长即触发 `PressedLong` 事件。
    pub long_press_time: Duration,

    /// 长按状态下，重复触发 `PressedRepeat` 事件的周期。
    pub repeat_interval: Duration,

    /// 扫描周期，即单次定时器每次启动的时长。
    ///
    /// 必须大于机械抖动的稳定时间，并且小于 `debounce`，
    /// 否则消抖窗口内观察不到多次采样。
    pub scan_period: Duration,
}

impl Default for ButtonConfig {
    /// 提供一套合理的默认配置。
    ///
    /// - 消抖: 20ms
    /// - 长按阈值: 500ms
    /// - 连发周期: 100ms
    /// - 扫描周期: 5ms
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(20),
            long_press_time: Duration::from_millis(500),
            repeat_interval: Duration::from_millis(100),
            scan_period: Duration::from_millis(5),
        }
    }
}

/// 创建单个按钮所需的全部信息。
pub struct ButtonDescriptor<'p, P> {
    /// 按钮在所属键盘中的位置，回调时原样传回。
    pub index: u8,
    /// 应用层的按键标识，例如键码。
    pub id: u8,
    /// 按钮借用定时器的共享池，缺失时创建失败。
    pub timer_pool: Option<&'p P>,
    pub config: ButtonConfig,
}

impl<'p, P> ButtonDescriptor<'p, P> {
    /// 使用默认时间参数创建描述。
    pub fn new(index: u8, id: u8, timer_pool: &'p P) -> Self {
        Self {
            index,
            id,
            timer_pool: Some(timer_pool),
            config: ButtonConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ButtonConfig) -> Self {
        self.config = config;
        self
    }
}
