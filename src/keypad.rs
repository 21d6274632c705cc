use heapless::Vec;

use crate::{
    timer::TimerPool, Button, ButtonDescriptor, ButtonEventData, ButtonInput, CreateError,
    EventHandler, NotifyError,
};

/// 按钮在键盘中的位置，创建后保持不变。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonHandle(usize);

impl ButtonHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 固定容量的按钮池。
///
/// 按钮只能创建，不能单独销毁；容量满后 `create` 返回
/// [`CreateError::CapacityExceeded`]，已有按钮不受影响。
pub struct Keypad<'p, P: TimerPool, H, const N: usize> {
    buttons: Vec<Button<'p, P, H>, N>,
}

impl<'p, P: TimerPool, H: EventHandler, const N: usize> Keypad<'p, P, H, N> {
    pub const fn new() -> Self {
        Self {
            buttons: Vec::new(),
        }
    }

    pub fn create(
        &mut self,
        descriptor: ButtonDescriptor<'p, P>,
        handler: H,
    ) -> Result<ButtonHandle, CreateError> {
        if self.buttons.is_full() {
            warn!("keypad: all {} button slots in use", N);
            return Err(CreateError::CapacityExceeded);
        }

        let button = Button::new(descriptor, handler)?;
        let handle = ButtonHandle(self.buttons.len());
        let (index, id) = (button.index(), button.id());
        self.buttons
            .push(button)
            .map_err(|_| CreateError::CapacityExceeded)?;
        debug!("keypad: button {} (index {}) in slot {}", id, index, handle.0);

        Ok(handle)
    }

    /// 把输入事件转交给对应的按钮。
    pub fn notify(
        &mut self,
        handle: ButtonHandle,
        input: ButtonInput,
    ) -> Result<Option<ButtonEventData>, NotifyError> {
        self.buttons
            .get_mut(handle.0)
            .ok_or(NotifyError::UnknownButton)?
            .notify(input)
    }

    pub fn button(&self, handle: ButtonHandle) -> Option<&Button<'p, P, H>> {
        self.buttons.get(handle.0)
    }

    pub fn button_mut(&mut self, handle: ButtonHandle) -> Option<&mut Button<'p, P, H>> {
        self.buttons.get_mut(handle.0)
    }

    /// 按应用层标识查找按钮。
    pub fn find_by_id(&self, id: u8) -> Option<ButtonHandle> {
        self.buttons
            .iter()
            .position(|button| button.id() == id)
            .map(ButtonHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ButtonHandle, &Button<'p, P, H>)> {
        self.buttons
            .iter()
            .enumerate()
            .map(|(slot, button)| (ButtonHandle(slot), button))
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<'p, P: TimerPool, H: EventHandler, const N: usize> Default for Keypad<'p, P, H, N> {
    fn default() -> Self {
        Self::new()
    }
}
