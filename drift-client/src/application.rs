use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use winit::event::{ElementState, TouchPhase, VirtualKeyCode};
use winit::event_loop::ControlFlow;
use winit::window::Window;

use drift_core::audio::{AudioPhase, AudioReactor};
use drift_core::error::DriftError;
use drift_core::game::DriftGame;
use drift_core::settings::Settings;
use drift_core::vehicle::VehiclePhysics;
use drift_physics::ArcadeWorld;

use crate::audio::RodioAudio;
use crate::client_events::Watching;
use crate::key_bindings::{action_for, is_start_key, KeyAction};
use crate::renderer::SceneRenderer;
use crate::score_display::TitleScore;

pub enum Phase {
    // Waiting for a key press, click or tap. Audio devices may only be opened
    // after one of those.
    StartScreen,
    Playing(Box<DriftGame<ArcadeWorld>>),
    Closed,
}

pub struct Application {
    window: Rc<Window>,
    settings: Settings,
    phase: Phase,
    last_frame: Instant,
    next_frame: Instant,
}

impl Watching for Application {
    fn on_key_down(&mut self, key: VirtualKeyCode) {
        match &mut self.phase {
            Phase::StartScreen if is_start_key(key) => self.start_game(),
            Phase::Playing(game) => {
                retry_audio(game);
                match action_for(key) {
                    Some(KeyAction::Drive(control)) => game.set_control(control, true),
                    Some(KeyAction::Reset) => game.reset_car(),
                    Some(KeyAction::Quit) => self.close(),
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn on_key_up(&mut self, key: VirtualKeyCode) {
        if let Phase::Playing(game) = &mut self.phase {
            if let Some(KeyAction::Drive(control)) = action_for(key) {
                game.set_control(control, false);
            }
        }
    }

    fn on_mouse_motion(&mut self, dx: f64, _dy: f64) {
        if let Phase::Playing(game) = &mut self.phase {
            game.on_pointer_motion(dx);
        }
    }

    fn on_left_mouse(&mut self, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match &mut self.phase {
            Phase::StartScreen if pressed => self.start_game(),
            Phase::Playing(game) => {
                if pressed {
                    retry_audio(game);
                }
                game.on_pointer_button(pressed);
            }
            _ => {}
        }
    }

    fn on_touch(&mut self, id: u64, phase: TouchPhase, x: f64, y: f64) {
        let starting = matches!(self.phase, Phase::StartScreen) && phase == TouchPhase::Started;
        if starting {
            self.start_game();
        }

        let size = self.window.inner_size();
        if let Phase::Playing(game) = &mut self.phase {
            match phase {
                TouchPhase::Started => {
                    if !starting {
                        retry_audio(game);
                    }
                    let x = x as f32 / size.width.max(1) as f32;
                    let y = y as f32 / size.height.max(1) as f32;
                    game.touch_start(id, x, y);
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    game.touch_end(id);
                }
                TouchPhase::Moved => {}
            }
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Phase::Playing(game) = &mut self.phase {
            game.resize(width, height);
        }
    }

    fn on_focus_lost(&mut self) {
        if let Phase::Playing(game) = &mut self.phase {
            game.release_inputs();
        }
    }
}

// Gives a game whose audio failed to start another go, once per user
// gesture. Returns true only when this call brought the audio up.
fn retry_audio<P: VehiclePhysics>(game: &mut DriftGame<P>) -> bool {
    if game.audio().phase() != AudioPhase::Constructed {
        return false;
    }
    match game.start_audio() {
        Ok(()) => game.audio().is_started(),
        Err(err) => {
            debug!("audio still unavailable: {}", err);
            false
        }
    }
}

impl Application {
    pub fn new(window: Rc<Window>, settings: Settings) -> Self {
        let now = Instant::now();
        Self {
            window,
            settings,
            phase: Phase::StartScreen,
            last_frame: now,
            next_frame: now,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    fn start_game(&mut self) {
        let renderer = match SceneRenderer::new(Rc::clone(&self.window), &self.settings) {
            Ok(renderer) => renderer,
            Err(err) => {
                error!("could not start the renderer: {:#}", err);
                self.phase = Phase::Closed;
                return;
            }
        };
        let scores = TitleScore::new(Rc::clone(&self.window));
        let audio = AudioReactor::new(Box::new(RodioAudio::new()));
        let physics = ArcadeWorld::new(&self.settings);

        let mut game = DriftGame::new(
            &self.settings,
            physics,
            audio,
            Box::new(scores),
            Box::new(renderer),
        );
        let size = self.window.inner_size();
        game.resize(size.width, size.height);

        if let Err(err) = game.start_audio() {
            warn!("{}; playing without sound", DriftError::from(err));
        }

        info!("drive started");
        self.last_frame = Instant::now();
        self.next_frame = self.last_frame;
        self.phase = Phase::Playing(Box::new(game));
    }

    // Runs a frame when one is due and tells the event loop when to wake up next.
    pub fn update(&mut self) -> ControlFlow {
        match &mut self.phase {
            Phase::StartScreen => ControlFlow::Wait,
            Phase::Closed => ControlFlow::Exit,
            Phase::Playing(game) => {
                let now = Instant::now();
                if now >= self.next_frame {
                    game.tick(now - self.last_frame);
                    self.last_frame = now;
                    self.next_frame = game.clock().next_deadline(now);
                }
                ControlFlow::WaitUntil(self.next_frame)
            }
        }
    }

    pub fn close(&mut self) {
        if let Phase::Playing(game) = &mut self.phase {
            game.teardown();
        }
        if !self.is_closed() {
            info!("closing");
            self.phase = Phase::Closed;
        }
    }
}
