use embassy_time::{Instant, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::{
    timer::{EmbassyTimer, TimerPool},
    Button, ButtonEventData, ButtonInput, EventHandler, NotifyError,
};

/// 定义GPIO按钮的有效电平。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// 低电平有效（例如，使用上拉电阻，按下时引脚接地）。
    Low,
    /// 高电平有效（例如，使用下拉电阻，按下时引脚接VCC）。
    High,
}

/// 为状态机产生输入事件的GPIO引脚。
///
/// 状态机本身只认 `Pressed` 和 `TimerElapsed` 两种输入，
/// 这里负责把引脚电平翻译成这两种事件。
pub struct GpioButton<P: InputPin> {
    pin: P,
    active_level: ActiveLevel,
}

impl<P: InputPin> GpioButton<P> {
    /// 创建一个新的GPIO按钮。
    ///
    /// # 参数
    /// * `pin`: 一个实现了 `InputPin` 的GPIO引脚。
    /// * `active_level`: 定义了按钮按下时的有效电平 (`ActiveLevel::Low` 或 `ActiveLevel::High`)。
    pub fn new(pin: P, active_level: ActiveLevel) -> Self {
        Self { pin, active_level }
    }

    /// 读取引脚，读取失败按未按下处理。
    pub fn is_pressed(&mut self) -> bool {
        match self.active_level {
            ActiveLevel::Low => self.pin.is_low().unwrap_or(false),
            ActiveLevel::High => self.pin.is_high().unwrap_or(false),
        }
    }

    /// 定时器到期时采样一次引脚。
    pub fn sample(&mut self) -> ButtonInput {
        if self.is_pressed() {
            ButtonInput::Pressed
        } else {
            ButtonInput::TimerElapsed
        }
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P> GpioButton<P>
where
    P: InputPin + Wait,
{
    pub async fn wait_for_press(&mut self) {
        match self.active_level {
            ActiveLevel::Low => self.pin.wait_for_low().await.unwrap_or_default(),
            ActiveLevel::High => self.pin.wait_for_high().await.unwrap_or_default(),
        }
    }

    /// 等待下一个输入事件。
    ///
    /// 没有截止时间(按钮空闲，未持有定时器)时等待引脚进入按下电平；
    /// 否则等到截止时间再采样。
    pub async fn next_input(&mut self, deadline: Option<Instant>) -> ButtonInput {
        match deadline {
            None => {
                self.wait_for_press().await;
                ButtonInput::Pressed
            }
            Some(deadline) => {
                Timer::at(deadline).await;
                self.sample()
            }
        }
    }
}

/// 驱动按钮前进一步。
///
/// 定时器池为空时先等待一个扫描周期再返回错误，
/// 调用方直接再次调用即可按扫描节奏重试。
pub async fn poll_button<P, T, H>(
    gpio: &mut GpioButton<P>,
    button: &mut Button<'_, T, H>,
) -> Result<Option<ButtonEventData>, NotifyError>
where
    P: InputPin + Wait,
    T: TimerPool<Timer = EmbassyTimer>,
    H: EventHandler,
{
    let deadline = button.timer().and_then(EmbassyTimer::deadline);
    let input = gpio.next_input(deadline).await;
    match button.notify(input) {
        Err(NotifyError::TimerUnavailable) => {
            Timer::after(button.config().scan_period).await;
            Err(NotifyError::TimerUnavailable)
        }
        result => result,
    }
}
