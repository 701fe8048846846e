// In-memory stand-ins for the game's collaborators, shared by the unit tests.
use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::audio::{AudioBackend, EngineSoundParams};
use crate::camera::CameraPose;
use crate::error::AudioError;
use crate::pose::{BodyState, Pose};
use crate::render::{Frame, Renderer};
use crate::score::ScoreSink;
use crate::vehicle::VehiclePhysics;

const WHEEL_OFFSETS: [[f32; 3]; 4] = [
    [1.5, -0.5, 1.0],
    [-1.5, -0.5, 1.0],
    [1.5, -0.5, -1.0],
    [-1.5, -0.5, -1.0],
];

// A vehicle whose body the test sets directly. Stepping just coasts the body
// along its velocity, so scripted speeds and headings survive a tick.
pub struct ScriptedVehicle {
    pub body: BodyState,
    pub steering: [f32; 4],
    pub engine_forces: [f32; 4],
    pub brakes: [f32; 4],
    pub frictions: [f32; 4],
    pub steps: u32,
    pub wheel_count: usize,
}

impl ScriptedVehicle {
    pub fn new() -> Self {
        Self {
            body: BodyState::at_rest(Vec3::new(0.0, 4.0, 0.0)),
            steering: [0.0; 4],
            engine_forces: [0.0; 4],
            brakes: [0.0; 4],
            frictions: [5.0; 4],
            steps: 0,
            wheel_count: 4,
        }
    }
}

impl VehiclePhysics for ScriptedVehicle {
    fn step(&mut self, dt: f32) {
        self.body.position += self.body.linear_velocity * dt;
        self.steps += 1;
    }

    fn body(&self) -> BodyState {
        self.body
    }

    fn set_body(&mut self, state: BodyState) {
        self.body = state;
    }

    fn wheel_count(&self) -> usize {
        self.wheel_count
    }

    fn set_steering(&mut self, angle: f32, wheel: usize) {
        self.steering[wheel] = angle;
    }

    fn apply_engine_force(&mut self, force: f32, wheel: usize) {
        self.engine_forces[wheel] = force;
    }

    fn set_brake(&mut self, force: f32, wheel: usize) {
        self.brakes[wheel] = force;
    }

    fn friction_slip(&self, wheel: usize) -> f32 {
        self.frictions[wheel]
    }

    fn set_friction_slip(&mut self, friction: f32, wheel: usize) {
        self.frictions[wheel] = friction;
    }

    fn update_wheel_transform(&mut self, wheel: usize) -> Pose {
        let offset = Vec3::from(WHEEL_OFFSETS[wheel]);
        Pose::new(
            self.body.position + self.body.orientation * offset,
            self.body.orientation,
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    Start,
    Engine(EngineSoundParams),
    SkidAttack,
    SkidRelease,
    Shutdown,
}

pub struct RecordingAudio {
    calls: Rc<RefCell<Vec<AudioCall>>>,
    pub fail_next_start: bool,
}

impl RecordingAudio {
    pub fn new() -> (Self, Rc<RefCell<Vec<AudioCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
                fail_next_start: false,
            },
            calls,
        )
    }
}

impl AudioBackend for RecordingAudio {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.fail_next_start {
            self.fail_next_start = false;
            return Err(AudioError::Device("no output device".to_owned()));
        }
        self.calls.borrow_mut().push(AudioCall::Start);
        Ok(())
    }

    fn set_engine(&mut self, params: EngineSoundParams) {
        self.calls.borrow_mut().push(AudioCall::Engine(params));
    }

    fn skid_attack(&mut self) {
        self.calls.borrow_mut().push(AudioCall::SkidAttack);
    }

    fn skid_release(&mut self) {
        self.calls.borrow_mut().push(AudioCall::SkidRelease);
    }

    fn shutdown(&mut self) {
        self.calls.borrow_mut().push(AudioCall::Shutdown);
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScoreCall {
    Total(f32),
    Drift(f32),
}

pub struct RecordingScores {
    calls: Rc<RefCell<Vec<ScoreCall>>>,
}

impl RecordingScores {
    pub fn new() -> (Self, Rc<RefCell<Vec<ScoreCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl ScoreSink for RecordingScores {
    fn on_score_changed(&mut self, total: f32) {
        self.calls.borrow_mut().push(ScoreCall::Total(total));
    }

    fn on_drift_score_changed(&mut self, current: f32) {
        self.calls.borrow_mut().push(ScoreCall::Drift(current));
    }
}

#[derive(Default, Debug)]
pub struct RenderLog {
    pub frames: u64,
    pub sizes: Vec<(u32, u32)>,
    pub disposals: u32,
    pub last_camera: Option<CameraPose>,
    pub dirty_frames: u64,
}

pub struct CountingRenderer {
    log: Rc<RefCell<RenderLog>>,
}

impl CountingRenderer {
    pub fn new() -> (Self, Rc<RefCell<RenderLog>>) {
        let log = Rc::new(RefCell::new(RenderLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Renderer for CountingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_camera = Some(frame.camera);
        if frame.decals_dirty {
            log.dirty_frames += 1;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().sizes.push((width, height));
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposals += 1;
    }
}
