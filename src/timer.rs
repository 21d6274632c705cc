use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

/// 按钮借用的单次定时器。
///
/// 定时器只负责计时，到期后由轮询方投递 `ButtonInput::TimerElapsed`。
pub trait OneShotTimer {
    /// 设置每次启动后的运行时长。
    fn set_interval(&mut self, interval: Duration);

    /// 以单次模式(重新)启动定时器。
    fn start(&mut self);

    /// 当前时间，与按钮配置中的时长使用同一时钟。
    fn now(&self) -> Instant;
}

/// 多个按钮共享的定时器资源池。
///
/// 两个操作都不能阻塞：池为空时 `try_acquire` 立即返回 `None`。
pub trait TimerPool {
    type Timer: OneShotTimer;

    fn try_acquire(&self) -> Option<Self::Timer>;

    fn release(&self, timer: Self::Timer);
}

/// 固定容量的定时器池，所有定时器在启动时放入，之后只在池和按钮之间流转。
pub struct StaticTimerPool<M: RawMutex, T, const N: usize> {
    timers: Mutex<M, RefCell<Vec<T, N>>>,
}

impl<M: RawMutex, T, const N: usize> StaticTimerPool<M, T, N> {
    /// 创建一个空池，需要用 [`fill`](Self::fill) 放入定时器。
    pub const fn new() -> Self {
        Self {
            timers: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// 放入一个定时器。池已满时原样返回。
    pub fn fill(&self, timer: T) -> Result<(), T> {
        self.timers.lock(|timers| timers.borrow_mut().push(timer))
    }

    /// 当前可借出的定时器数量。
    pub fn available(&self) -> usize {
        self.timers.lock(|timers| timers.borrow().len())
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, T, const N: usize> Default for StaticTimerPool<M, T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, T: OneShotTimer, const N: usize> TimerPool for StaticTimerPool<M, T, N> {
    type Timer = T;

    fn try_acquire(&self) -> Option<T> {
        self.timers.lock(|timers| timers.borrow_mut().pop())
    }

    fn release(&self, timer: T) {
        let overflow = self.timers.lock(|timers| timers.borrow_mut().push(timer).is_err());
        if overflow {
            error!("timer pool: released a timer into a full pool, dropping it");
        }
    }
}

/// 基于 embassy 时间驱动的单次定时器。
///
/// 启动时只记录截止时间，轮询方通过 [`wait`](Self::wait) 或
/// [`deadline`](Self::deadline) 得知何时到期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbassyTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl EmbassyTimer {
    pub const fn new() -> Self {
        Self {
            interval: Duration::from_ticks(0),
            deadline: None,
        }
    }

    /// 已启动定时器的到期时间，未启动时为 `None`。
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_elapsed(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// 等待到期。未启动时永远挂起。
    pub async fn wait(&self) {
        match self.deadline {
            Some(deadline) => Timer::at(deadline).await,
            None => core::future::pending().await,
        }
    }
}

impl Default for EmbassyTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl OneShotTimer for EmbassyTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.interval);
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
