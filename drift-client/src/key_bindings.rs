use winit::event::VirtualKeyCode;

use drift_core::controls::Control;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Drive(Control),
    Reset,
    Quit,
}

pub fn action_for(key: VirtualKeyCode) -> Option<KeyAction> {
    use VirtualKeyCode::*;

    let action = match key {
        W | Up => KeyAction::Drive(Control::Forward),
        S | Down => KeyAction::Drive(Control::Backward),
        A | Left => KeyAction::Drive(Control::Left),
        D | Right => KeyAction::Drive(Control::Right),
        Space => KeyAction::Drive(Control::Handbrake),
        R => KeyAction::Reset,
        Escape => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

// Keys that leave the start screen. Audio may only begin after one of these.
pub fn is_start_key(key: VirtualKeyCode) -> bool {
    matches!(key, VirtualKeyCode::Return | VirtualKeyCode::Space)
}
