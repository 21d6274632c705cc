#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Instant};
use keypad_button::{
    config::ButtonConfig,
    timer::{OneShotTimer, StaticTimerPool},
};

// --- Mock Hardware (模拟硬件) ---

/// 手动推进的时钟，所有模拟定时器共享同一个。
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn set_millis(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn now(&self) -> Instant {
        Instant::from_millis(self.0.get())
    }
}

pub struct MockTimer {
    clock: ManualClock,
    pub interval: Duration,
    pub armed_at: Option<Instant>,
    pub starts: u32,
}

impl MockTimer {
    pub fn new(clock: &ManualClock) -> Self {
        Self {
            clock: clock.clone(),
            interval: Duration::from_ticks(0),
            armed_at: None,
            starts: 0,
        }
    }
}

impl OneShotTimer for MockTimer {
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn start(&mut self) {
        self.armed_at = Some(self.clock.now());
        self.starts += 1;
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }
}

pub type MockPool<const N: usize> = StaticTimerPool<NoopRawMutex, MockTimer, N>;

/// 创建一个装满 `N` 个模拟定时器的池。
pub fn full_pool<const N: usize>(clock: &ManualClock) -> MockPool<N> {
    let pool = MockPool::<N>::new();
    for _ in 0..N {
        assert!(pool.fill(MockTimer::new(clock)).is_ok());
    }
    pool
}

/// 消抖 40ms，扫描 10ms，长按 100ms，连发 30ms。
pub fn test_config() -> ButtonConfig {
    ButtonConfig {
        debounce: Duration::from_millis(40),
        long_press_time: Duration::from_millis(100),
        repeat_interval: Duration::from_millis(30),
        scan_period: Duration::from_millis(10),
    }
}
