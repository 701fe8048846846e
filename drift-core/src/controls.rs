// The five driver controls; adapters (keyboard, touch) translate their own
// events into these.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    Left,
    Right,
    Handbrake,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Forward,
        Control::Backward,
        Control::Left,
        Control::Right,
        Control::Handbrake,
    ];
}

// ControlState is written by input callbacks and only read by the simulation.
// Flags are independent: opposing directions may both be held, and it is up
// to the dynamics controller to decide what that means.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub handbrake: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, control: Control, pressed: bool) {
        match control {
            Control::Forward => self.forward = pressed,
            Control::Backward => self.backward = pressed,
            Control::Left => self.left = pressed,
            Control::Right => self.right = pressed,
            Control::Handbrake => self.handbrake = pressed,
        }
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Backward => self.backward,
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Handbrake => self.handbrake,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
