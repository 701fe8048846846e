use std::collections::HashMap;

use crate::controls::{Control, ControlState};

// A rectangular hit region in normalized screen space ([0, 1] on both axes,
// origin at the top-left, as winit reports positions).
#[derive(Copy, Clone, Debug)]
pub struct TouchRegion {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    pub control: Control,
}

impl TouchRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32, control: Control) -> TouchRegion {
        TouchRegion {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
            control,
        }
    }

    #[inline]
    fn is_inside(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

// On-screen buttons for touch devices: a D-pad in the bottom-left corner and a
// handbrake button in the bottom-right one. Each touch holds the control it
// landed on until that same touch ends, so lifting one finger never releases
// a control held by another.
pub struct TouchLayout {
    regions: Vec<TouchRegion>,
    active: HashMap<u64, Control>,
}

impl Default for TouchLayout {
    fn default() -> Self {
        let cell = 0.08;
        let pad_x = 0.02;
        let pad_y = 0.70;
        Self::new(vec![
            TouchRegion::new(pad_x + cell, pad_y, cell, cell, Control::Forward),
            TouchRegion::new(pad_x, pad_y + cell, cell, cell, Control::Left),
            TouchRegion::new(pad_x + 2.0 * cell, pad_y + cell, cell, cell, Control::Right),
            TouchRegion::new(pad_x + cell, pad_y + 2.0 * cell, cell, cell, Control::Backward),
            TouchRegion::new(0.80, 0.74, 0.16, 0.20, Control::Handbrake),
        ])
    }
}

impl TouchLayout {
    pub fn new(regions: Vec<TouchRegion>) -> Self {
        Self {
            regions,
            active: HashMap::new(),
        }
    }

    pub fn control_at(&self, x: f32, y: f32) -> Option<Control> {
        self.regions
            .iter()
            .find(|region| region.is_inside(x, y))
            .map(|region| region.control)
    }

    // Returns the control that was pressed, if the touch landed on a button.
    pub fn touch_start(&mut self, id: u64, x: f32, y: f32, controls: &mut ControlState) -> Option<Control> {
        let control = self.control_at(x, y)?;
        self.active.insert(id, control);
        controls.set(control, true);
        Some(control)
    }

    // Ended and cancelled touches both land here.
    pub fn touch_end(&mut self, id: u64, controls: &mut ControlState) -> Option<Control> {
        let control = self.active.remove(&id)?;
        let still_held = self.active.values().any(|held| *held == control);
        if !still_held {
            controls.set(control, false);
        }
        Some(control)
    }

    pub fn release_all(&mut self, controls: &mut ControlState) {
        for (_, control) in self.active.drain() {
            controls.set(control, false);
        }
    }
}
