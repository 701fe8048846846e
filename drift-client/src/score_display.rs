use std::rc::Rc;

use winit::window::Window;

use drift_core::score::{hud_text, ScoreSink};

// Shows the scores in the window title; there is no in-scene HUD.
pub struct TitleScore {
    window: Rc<Window>,
    total: f32,
    current: f32,
    title: String,
}

impl TitleScore {
    pub fn new(window: Rc<Window>) -> Self {
        let mut display = TitleScore {
            window,
            total: 0.0,
            current: 0.0,
            title: String::new(),
        };
        display.refresh();
        display
    }

    // only touches the window when the visible text changes
    fn refresh(&mut self) {
        let title = format!("Drift | {}", hud_text(self.total, self.current));
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

impl ScoreSink for TitleScore {
    fn on_score_changed(&mut self, total: f32) {
        self.total = total;
        self.refresh();
    }

    fn on_drift_score_changed(&mut self, current: f32) {
        self.current = current;
        self.refresh();
    }
}
