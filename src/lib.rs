#![no_std]

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod gpio;
pub mod keypad;
pub mod timer;

pub use config::*;
pub use error::*;
use embassy_time::{Duration, Instant};

use crate::timer::{OneShotTimer, TimerPool};

/// 轮询方送入状态机的输入事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonInput {
    /// 本次采样时引脚处于按下电平。
    Pressed,
    /// 单次定时器到期，期间没有收到 `Pressed`。
    TimerElapsed,
}

/// 上报给应用层的按钮事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
    PressedLong,
    PressedRepeat,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEventData {
    pub id: u8,
    pub event: ButtonEvent,
    pub timestamp: Instant,
}

/// 接收已分类事件的回调，在触发它的 `notify` 调用中同步执行。
///
/// 所有 `FnMut(u8, &ButtonEventData)` 闭包都实现了这个 trait，
/// 第一个参数是按钮的 `index`。
pub trait EventHandler {
    fn on_event(&mut self, index: u8, data: &ButtonEventData);
}

impl<F> EventHandler for F
where
    F: FnMut(u8, &ButtonEventData),
{
    fn on_event(&mut self, index: u8, data: &ButtonEventData) {
        self(index, data)
    }
}

/// 忽略所有事件，只使用 `notify` 返回值时使用。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {
    fn on_event(&mut self, _index: u8, _data: &ButtonEventData) {}
}

/// 消抖与按压分类状态机的状态。
///
/// `Idle` 和 `Released` 不持有定时器，其余状态都必须持有一个。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    ProbablePress,
    PressedBounceBreak,
    PressedBounceMake,
    Pressed,
    PressedLong,
    ReleasedBounceBreak,
    ReleasedBounceMake,
    Released,
}

impl ButtonState {
    /// 是否为不持有定时器的静止状态。
    pub fn is_quiescent(self) -> bool {
        matches!(self, ButtonState::Idle | ButtonState::Released)
    }
}

struct Transition {
    next: ButtonState,
    record: bool,
    event: Option<ButtonEvent>,
}

impl Transition {
    fn to(next: ButtonState) -> Self {
        Self {
            next,
            record: false,
            event: None,
        }
    }

    fn recorded(mut self) -> Self {
        self.record = true;
        self
    }

    fn firing(mut self, event: ButtonEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// `elapsed` 为距上次记录时间的时长。
    fn resolve(
        state: ButtonState,
        input: ButtonInput,
        elapsed: Duration,
        config: &ButtonConfig,
    ) -> Self {
        use ButtonInput as I;
        use ButtonState as S;

        match (state, input) {
            (S::Idle | S::Released, I::Pressed) => Self::to(S::ProbablePress),
            (S::Idle | S::Released, I::TimerElapsed) => Self::to(state),

            (S::ProbablePress, I::Pressed) => Self::to(S::PressedBounceBreak).recorded(),
            (S::ProbablePress, I::TimerElapsed) => Self::to(S::Idle),

            (S::PressedBounceBreak, I::Pressed) => Self::to(S::PressedBounceMake).recorded(),
            (S::PressedBounceBreak, I::TimerElapsed) => Self::to(S::ProbablePress),

            (S::PressedBounceMake, I::Pressed) if elapsed > config.debounce => {
                Self::to(S::Pressed).recorded().firing(ButtonEvent::Pressed)
            }
            (S::PressedBounceMake, I::Pressed) => Self::to(S::PressedBounceMake),
            (S::PressedBounceMake, I::TimerElapsed) => Self::to(S::PressedBounceBreak),

            (S::Pressed, I::Pressed) if elapsed > config.long_press_time => {
                Self::to(S::PressedLong)
                    .recorded()
                    .firing(ButtonEvent::PressedLong)
            }
            (S::Pressed, I::Pressed) => Self::to(S::Pressed),
            (S::Pressed, I::TimerElapsed) => Self::to(S::ReleasedBounceBreak),

            (S::PressedLong, I::Pressed) if elapsed > config.repeat_interval => {
                Self::to(S::PressedLong)
                    .recorded()
                    .firing(ButtonEvent::PressedRepeat)
            }
            (S::PressedLong, I::Pressed) => Self::to(S::PressedLong),
            (S::PressedLong, I::TimerElapsed) => Self::to(S::ReleasedBounceBreak),

            // 释放侧抖动中再次按下，按长按继续处理
            (S::ReleasedBounceBreak, I::Pressed) => Self::to(S::PressedLong),
            (S::ReleasedBounceBreak, I::TimerElapsed) => Self::to(S::ReleasedBounceMake),

            (S::ReleasedBounceMake, I::Pressed) => Self::to(S::PressedBounceBreak),
            (S::ReleasedBounceMake, I::TimerElapsed) => {
                Self::to(S::Released).firing(ButtonEvent::Released)
            }
        }
    }
}

/// 单个物理按键的消抖状态机。
///
/// 按钮在离开静止状态时从共享池借用一个定时器，回到 `Idle` 或 `Released`
/// 时归还，因此空闲按钮不占用任何定时器。
pub struct Button<'p, P: TimerPool, H> {
    index: u8,
    id: u8,
    state: ButtonState,
    timer: Option<P::Timer>,
    timer_pool: &'p P,
    config: ButtonConfig,
    previous_time: Instant,
    handler: H,
}

impl<'p, P: TimerPool, H: EventHandler> Button<'p, P, H> {
    pub fn new(descriptor: ButtonDescriptor<'p, P>, handler: H) -> Result<Self, CreateError> {
        let timer_pool = descriptor.timer_pool.ok_or_else(|| {
            warn!("button {}: no timer pool", descriptor.id);
            CreateError::MissingTimerPool
        })?;
        let config = descriptor.config;
        if config.scan_period == Duration::from_ticks(0) {
            return Err(CreateError::InvalidScanPeriod);
        }
        if config.scan_period >= config.debounce {
            warn!(
                "button {}: scan period {} ms does not fit inside debounce {} ms",
                descriptor.id,
                config.scan_period.as_millis(),
                config.debounce.as_millis()
            );
        }

        Ok(Self {
            index: descriptor.index,
            id: descriptor.id,
            state: ButtonState::Released,
            timer: None,
            timer_pool,
            config,
            previous_time: Instant::from_ticks(0),
            handler,
        })
    }

    /// 处理一次输入事件。
    ///
    /// 成功时返回本次确认的事件(如果有)，回调已在返回前执行。
    /// 需要定时器而池为空时返回 [`NotifyError::TimerUnavailable`]，
    /// 状态不变，调用方应在下一个扫描周期重新投递同一事件。
    pub fn notify(&mut self, input: ButtonInput) -> Result<Option<ButtonEventData>, NotifyError> {
        if self.state.is_quiescent() && input == ButtonInput::TimerElapsed {
            return Ok(None);
        }

        let mut timer = match self.timer.take() {
            Some(timer) => timer,
            None => {
                let mut timer = self.timer_pool.try_acquire().ok_or_else(|| {
                    warn!("button {}: timer pool exhausted in {:?}", self.id, self.state);
                    NotifyError::TimerUnavailable
                })?;
                timer.set_interval(self.config.scan_period);
                timer
            }
        };

        let now = timer.now();
        let elapsed = now.saturating_duration_since(self.previous_time);
        let transition = Transition::resolve(self.state, input, elapsed, &self.config);

        if transition.record {
            self.previous_time = now;
        }

        if transition.next.is_quiescent() {
            self.timer_pool.release(timer);
        } else {
            timer.start();
            self.timer = Some(timer);
        }

        let data = transition.event.map(|event| ButtonEventData {
            id: self.id,
            event,
            timestamp: now,
        });
        if let Some(data) = &data {
            debug!("button {}: {:?} at {} ms", self.id, data.event, now.as_millis());
            self.handler.on_event(self.index, data);
        }

        if transition.next != self.state {
            trace!(
                "button {}: {:?} -> {:?} on {:?}",
                self.id,
                self.state,
                transition.next,
                input
            );
        }
        self.state = transition.next;

        Ok(data)
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// 当前借用的定时器，轮询方可以借此得知下一次到期时间。
    pub fn timer(&self) -> Option<&P::Timer> {
        self.timer.as_ref()
    }

    pub fn holds_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// 替换时间参数。持有定时器时新的扫描周期从下一次启动生效。
    pub fn set_config(&mut self, config: ButtonConfig) {
        if let Some(timer) = self.timer.as_mut() {
            timer.set_interval(config.scan_period);
        }
        self.config = config;
    }

    /// 归还定时器并回到创建时的 `Released` 状态，不触发任何事件。
    pub fn reset(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.timer_pool.release(timer);
        }
        self.state = ButtonState::Released;
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}
