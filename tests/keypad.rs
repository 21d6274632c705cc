mod common;

use std::cell::RefCell;

use common::{full_pool, test_config, ManualClock, MockPool};
use keypad_button::{
    keypad::{ButtonHandle, Keypad},
    ButtonDescriptor, ButtonEvent, ButtonEventData, ButtonInput, ButtonState, CreateError,
    NoopHandler, NotifyError,
};

#[test]
fn test_create_past_capacity_fails_without_touching_existing() {
    let clock = ManualClock::default();
    let pool = full_pool::<2>(&clock);
    let mut keypad: Keypad<'_, MockPool<2>, NoopHandler, 3> = Keypad::new();
    assert!(keypad.is_empty());
    assert_eq!(keypad.capacity(), 3);

    let handles: Vec<ButtonHandle> = (0..3u8)
        .map(|i| {
            keypad
                .create(
                    ButtonDescriptor::new(i, b'1' + i, &pool).with_config(test_config()),
                    NoopHandler,
                )
                .unwrap()
        })
        .collect();
    assert_eq!(keypad.len(), 3);

    // 让第一个按钮进入非空闲状态，再尝试创建第四个
    keypad.notify(handles[0], ButtonInput::Pressed).unwrap();

    let result = keypad.create(ButtonDescriptor::new(3, b'4', &pool), NoopHandler);
    assert_eq!(result, Err(CreateError::CapacityExceeded));
    assert_eq!(keypad.len(), 3);

    let first = keypad.button(handles[0]).unwrap();
    assert_eq!(first.state(), ButtonState::ProbablePress);
    assert!(first.holds_timer());
    for (slot, handle) in handles.iter().enumerate() {
        let button = keypad.button(*handle).unwrap();
        assert_eq!(handle.index(), slot);
        assert_eq!(button.index(), slot as u8);
        assert_eq!(button.id(), b'1' + slot as u8);
    }
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_create_without_timer_pool_fails() {
    let mut keypad: Keypad<'_, MockPool<1>, NoopHandler, 2> = Keypad::new();
    let descriptor = ButtonDescriptor {
        index: 0,
        id: b'A',
        timer_pool: None,
        config: test_config(),
    };

    assert_eq!(
        keypad.create(descriptor, NoopHandler),
        Err(CreateError::MissingTimerPool)
    );
    assert!(keypad.is_empty());
}

#[test]
fn test_buttons_are_independent_and_share_the_pool() {
    let clock = ManualClock::default();
    let pool = full_pool::<2>(&clock);
    let log = RefCell::new(Vec::new());
    let record = |index: u8, data: &ButtonEventData| log.borrow_mut().push((index, data.id, data.event));
    let mut keypad: Keypad<'_, _, _, 4> = Keypad::new();

    let up = keypad
        .create(ButtonDescriptor::new(0, b'U', &pool).with_config(test_config()), record)
        .unwrap();
    let down = keypad
        .create(ButtonDescriptor::new(1, b'D', &pool).with_config(test_config()), record)
        .unwrap();
    let enter = keypad
        .create(ButtonDescriptor::new(2, b'E', &pool).with_config(test_config()), record)
        .unwrap();
    assert_eq!(keypad.find_by_id(b'D'), Some(down));
    assert_eq!(keypad.find_by_id(b'X'), None);

    for t in (0..=70).step_by(10) {
        clock.set_millis(t);
        keypad.notify(up, ButtonInput::Pressed).unwrap();
        if t >= 30 {
            keypad.notify(down, ButtonInput::Pressed).unwrap();
        }
    }
    assert_eq!(pool.available(), 0);

    // 两个定时器都已借出，第三个按钮只能等待
    clock.set_millis(80);
    assert_eq!(
        keypad.notify(enter, ButtonInput::Pressed),
        Err(NotifyError::TimerUnavailable)
    );
    assert_eq!(keypad.button(enter).unwrap().state(), ButtonState::Released);

    for t in [80, 90, 100] {
        clock.set_millis(t);
        keypad.notify(up, ButtonInput::TimerElapsed).unwrap();
    }
    assert_eq!(pool.available(), 1);
    assert_eq!(keypad.button(down).unwrap().state(), ButtonState::PressedBounceMake);

    clock.set_millis(110);
    assert_eq!(keypad.notify(enter, ButtonInput::Pressed), Ok(None));

    assert_eq!(
        log.borrow().as_slice(),
        &[(0, b'U', ButtonEvent::Pressed), (0, b'U', ButtonEvent::Released)]
    );
    let states: Vec<_> = keypad.iter().map(|(_, button)| button.state()).collect();
    assert_eq!(
        states,
        vec![
            ButtonState::Released,
            ButtonState::PressedBounceMake,
            ButtonState::ProbablePress
        ]
    );
}

#[test]
fn test_notify_unknown_handle() {
    let clock = ManualClock::default();
    let pool = full_pool::<1>(&clock);
    let mut big: Keypad<'_, MockPool<1>, NoopHandler, 2> = Keypad::new();
    let mut small: Keypad<'_, MockPool<1>, NoopHandler, 2> = Keypad::default();

    big.create(ButtonDescriptor::new(0, 0, &pool), NoopHandler).unwrap();
    let second = big.create(ButtonDescriptor::new(1, 1, &pool), NoopHandler).unwrap();
    small.create(ButtonDescriptor::new(0, 0, &pool), NoopHandler).unwrap();

    let err = small.notify(second, ButtonInput::Pressed).unwrap_err();
    assert_eq!(err, NotifyError::UnknownButton);
    assert!(!err.is_retryable());
    assert!(small.button(second).is_none());
}
