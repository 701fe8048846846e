use winit::event::{ElementState, TouchPhase, VirtualKeyCode};

pub trait Watching {
    fn on_key_down(&mut self, key: VirtualKeyCode);
    fn on_key_up(&mut self, key: VirtualKeyCode);

    fn on_mouse_motion(&mut self, dx: f64, dy: f64);
    fn on_left_mouse(&mut self, state: ElementState);

    // x and y are window pixels
    fn on_touch(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64);

    fn on_resize(&mut self, width: u32, height: u32);
    fn on_focus_lost(&mut self);
}
