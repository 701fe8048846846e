use std::time::Duration;

use glam::Vec3;
use tracing::info;

use crate::audio::AudioReactor;
use crate::camera::CameraRig;
use crate::clock::SimulationClock;
use crate::controls::{Control, ControlState};
use crate::drift::{DriftEvent, DriftReading, DriftScorer, DriftState, SessionScore};
use crate::dynamics::{Car, DynamicsController};
use crate::effects::EffectsCoordinator;
use crate::error::AudioError;
use crate::render::{Frame, Renderer};
use crate::score::ScoreSink;
use crate::settings::Settings;
use crate::touch::TouchLayout;
use crate::vehicle::{VehiclePhysics, REAR_LEFT, REAR_RIGHT};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    TornDown,
}

/*
 * One drifting session. The host calls `tick` once per frame; input
 * callbacks go through `set_control` and friends. After `teardown` every
 * entry point is inert, so late callbacks from the platform cannot reach
 * the released audio or rendering resources.
 */
pub struct DriftGame<P> {
    controls: ControlState,
    touch: TouchLayout,
    dynamics: DynamicsController<P>,
    drift: DriftScorer,
    session: SessionScore,
    effects: EffectsCoordinator,
    camera: CameraRig,
    clock: SimulationClock,
    audio: AudioReactor,
    scores: Box<dyn ScoreSink>,
    renderer: Box<dyn Renderer>,
    spawn_point: Vec3,
    lifecycle: Lifecycle,
}

impl<P: VehiclePhysics> DriftGame<P> {
    pub fn new(
        settings: &Settings,
        physics: P,
        audio: AudioReactor,
        scores: Box<dyn ScoreSink>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let mut dynamics = DynamicsController::new(physics, settings.dynamics.clone());
        dynamics.car_mut().sync_poses();

        info!("drift game created");
        Self {
            controls: ControlState::new(),
            touch: TouchLayout::default(),
            dynamics,
            drift: DriftScorer::new(settings.drift.clone()),
            session: SessionScore::default(),
            effects: EffectsCoordinator::new(settings.effects.clone()),
            camera: CameraRig::new(settings.camera.clone()),
            clock: SimulationClock::new(&settings.clock),
            audio,
            scores,
            renderer,
            spawn_point: Vec3::from(settings.world.spawn_point),
            lifecycle: Lifecycle::Running,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn car(&self) -> &Car<P> {
        self.dynamics.car()
    }

    pub fn car_mut(&mut self) -> &mut Car<P> {
        self.dynamics.car_mut()
    }

    pub fn drift_state(&self) -> DriftState {
        self.drift.state()
    }

    pub fn session_score(&self) -> f32 {
        self.session.total()
    }

    pub fn effects(&self) -> &EffectsCoordinator {
        &self.effects
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn audio(&self) -> &AudioReactor {
        &self.audio
    }

    pub fn start_audio(&mut self) -> Result<(), AudioError> {
        if !self.is_running() {
            return Ok(());
        }
        self.audio.start_music()
    }

    pub fn set_control(&mut self, control: Control, pressed: bool) {
        if self.is_running() {
            self.controls.set(control, pressed);
        }
    }

    pub fn touch_start(&mut self, id: u64, x: f32, y: f32) -> Option<Control> {
        if !self.is_running() {
            return None;
        }
        self.touch.touch_start(id, x, y, &mut self.controls)
    }

    pub fn touch_end(&mut self, id: u64) -> Option<Control> {
        if !self.is_running() {
            return None;
        }
        self.touch.touch_end(id, &mut self.controls)
    }

    pub fn on_pointer_button(&mut self, pressed: bool) {
        if self.is_running() {
            self.camera.on_pointer_button(pressed);
        }
    }

    pub fn on_pointer_motion(&mut self, dx: f64) {
        if self.is_running() {
            self.camera.on_pointer_motion(dx);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.is_running() {
            self.camera.set_viewport(width, height);
            self.renderer.resize(width, height);
        }
    }

    // One frame: physics, controls, scoring, visual sync, effects, camera and
    // finally the render submission, always in that order.
    pub fn tick(&mut self, elapsed: Duration) -> Option<DriftReading> {
        if !self.is_running() {
            return None;
        }

        let steps = self.clock.begin_frame(elapsed);
        let dt = self.clock.timestep();
        for _ in 0..steps {
            self.dynamics.car_mut().step(dt);
        }

        self.dynamics.apply(&self.controls);

        let body = self.dynamics.car().body();
        self.audio.update_engine_sound(body.speed());

        let reading = self.drift.update(&body, self.controls.handbrake);
        self.report_drift(&reading);

        let car = self.dynamics.car_mut();
        car.sync_poses();
        let rear_wheels = [
            car.wheel_pose(REAR_LEFT).position,
            car.wheel_pose(REAR_RIGHT).position,
        ];
        let chassis = car.chassis_pose();

        self.effects.update(&reading, rear_wheels);
        let camera = self.camera.update(chassis.position);

        let decals_dirty = self.effects.decals_mut().take_dirty();
        let frame = Frame {
            index: self.clock.frames(),
            camera,
            projection: self.camera.projection_matrix(),
            chassis,
            wheels: self.dynamics.car().wheel_poses(),
            emitters: self.effects.emitters(),
            decals: self.effects.decals(),
            decals_dirty,
        };
        self.renderer.render(&frame);

        Some(reading)
    }

    fn report_drift(&mut self, reading: &DriftReading) {
        match reading.event {
            Some(DriftEvent::Started) => self.audio.play_skid_sound(),
            Some(DriftEvent::Ended { score, credited }) => {
                self.audio.stop_skid_sound();
                if credited {
                    let total = self.session.credit(score);
                    self.scores.on_score_changed(total);
                }
                self.scores.on_drift_score_changed(0.0);
            }
            None => {}
        }

        if reading.drifting {
            self.scores.on_drift_score_changed(reading.score);
        }
    }

    // Lets go of every held key, touch and the rotate button, as when the
    // window loses focus.
    pub fn release_inputs(&mut self) {
        self.touch.release_all(&mut self.controls);
        self.controls.clear();
        self.camera.on_pointer_button(false);
    }

    // Back to the spawn point with a clean slate: no marks, no points, and
    // any drift in progress is dropped without credit.
    pub fn reset_car(&mut self) {
        if !self.is_running() {
            return;
        }

        self.dynamics.car_mut().reset(self.spawn_point);
        self.effects.clear_decals();

        if self.drift.state().active {
            self.audio.stop_skid_sound();
        }
        self.drift.reset();
        self.session.reset();

        self.scores.on_score_changed(0.0);
        self.scores.on_drift_score_changed(0.0);
        info!("car reset to {:?}", self.spawn_point);
    }

    // Safe to call any number of times. The loop and input go first so that
    // nothing can call into audio or rendering once they are released.
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.lifecycle = Lifecycle::TornDown;
        self.clock.halt();
        self.release_inputs();

        self.audio.stop_all();
        self.renderer.dispose();
        info!("drift game torn down after {} frames", self.clock.frames());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Quat;

    use super::*;
    use crate::fakes::*;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        game: DriftGame<ScriptedVehicle>,
        audio: Rc<RefCell<Vec<AudioCall>>>,
        scores: Rc<RefCell<Vec<ScoreCall>>>,
        render: Rc<RefCell<RenderLog>>,
    }

    fn harness() -> Harness {
        let mut settings = Settings::default();
        settings.effects.decal_resolution = 256;

        let (audio_backend, audio) = RecordingAudio::new();
        let (score_sink, scores) = RecordingScores::new();
        let (renderer, render) = CountingRenderer::new();

        let mut game = DriftGame::new(
            &settings,
            ScriptedVehicle::new(),
            AudioReactor::new(Box::new(audio_backend)),
            Box::new(score_sink),
            Box::new(renderer),
        );
        game.start_audio().unwrap();

        Harness {
            game,
            audio,
            scores,
            render,
        }
    }

    impl Harness {
        fn slide(&mut self, speed: f32, angle: f32) {
            let body = &mut self.game.car_mut().physics_mut().body;
            body.position = Vec3::new(0.0, 0.5, 0.0);
            body.orientation = Quat::from_rotation_y(angle);
            body.linear_velocity = -Vec3::Z * speed;
        }

        fn skid_calls(&self) -> Vec<AudioCall> {
            self.audio
                .borrow()
                .iter()
                .filter(|call| matches!(call, AudioCall::SkidAttack | AudioCall::SkidRelease))
                .cloned()
                .collect()
        }

        fn totals(&self) -> Vec<f32> {
            self.scores
                .borrow()
                .iter()
                .filter_map(|call| match call {
                    ScoreCall::Total(total) => Some(*total),
                    _ => None,
                })
                .collect()
        }

        fn last_drift_display(&self) -> Option<f32> {
            self.scores.borrow().iter().rev().find_map(|call| match call {
                ScoreCall::Drift(current) => Some(*current),
                _ => None,
            })
        }
    }

    #[test]
    fn test_tick_runs_whole_pipeline() {
        let mut h = harness();
        h.game.set_control(Control::Forward, true);

        let reading = h.game.tick(FRAME).unwrap();
        assert!(!reading.drifting);

        assert_eq!(h.game.car().physics().steps, 1);
        assert_eq!(h.game.car().physics().engine_forces[0], -1000.0);
        assert_eq!(h.render.borrow().frames, 1);
        assert!(h
            .audio
            .borrow()
            .iter()
            .any(|call| matches!(call, AudioCall::Engine(_))));
        // the camera chases the synced chassis
        assert_eq!(
            h.render.borrow().last_camera.unwrap().target,
            h.game.car().chassis_pose().position
        );
    }

    #[test]
    fn test_two_wheeled_physics_still_ticks() {
        let mut physics = ScriptedVehicle::new();
        physics.wheel_count = 2;
        physics.body.linear_velocity = -Vec3::Z * 12.0;
        physics.body.orientation = Quat::from_rotation_y(0.6);

        let (renderer, render) = CountingRenderer::new();
        let mut game = DriftGame::new(
            &Settings::default(),
            physics,
            AudioReactor::silent(),
            Box::new(crate::score::LatestScores::default()),
            Box::new(renderer),
        );

        let reading = game.tick(FRAME).unwrap();
        assert!(reading.drifting);
        assert_eq!(render.borrow().frames, 1);
        // smoke sits on the chassis where the rear wheels would be
        let chassis = game.car().chassis_pose().position;
        assert!(game.effects().emitters().iter().all(|e| e.anchor() == chassis));
    }

    #[test]
    fn test_long_drift_is_banked() {
        let mut h = harness();
        h.slide(10.0, 0.5);
        for _ in 0..20 {
            let reading = h.game.tick(FRAME).unwrap();
            assert!(reading.drifting);
        }
        assert!((h.last_drift_display().unwrap() - 70.0).abs() < 0.05);

        h.slide(10.0, 0.0);
        h.game.tick(FRAME);

        assert!((h.game.session_score() - 70.0).abs() < 0.05);
        assert_eq!(h.totals().len(), 1);
        assert!((h.totals()[0] - 70.0).abs() < 0.05);
        assert_eq!(h.last_drift_display(), Some(0.0));
        assert_eq!(h.skid_calls(), vec![AudioCall::SkidAttack, AudioCall::SkidRelease]);
        assert_eq!(h.game.drift_state().score, 0.0);
    }

    #[test]
    fn test_short_drift_is_discarded() {
        let mut h = harness();
        h.slide(10.0, 0.5);
        for _ in 0..14 {
            h.game.tick(FRAME);
        }
        h.slide(4.0, 0.5);
        h.game.tick(FRAME);

        assert_eq!(h.game.session_score(), 0.0);
        assert!(h.totals().is_empty());
        assert_eq!(h.last_drift_display(), Some(0.0));
    }

    #[test]
    fn test_fast_drift_marks_ground() {
        let mut h = harness();
        h.slide(12.0, 0.6);
        h.game.tick(FRAME);

        assert!(h.game.effects().emitters().iter().all(|e| e.is_visible()));
        assert!(!h.game.effects().decals().is_blank());
        assert_eq!(h.render.borrow().dirty_frames, 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut h = harness();
        h.slide(12.0, 0.6);
        for _ in 0..30 {
            h.game.tick(FRAME);
        }
        h.slide(0.0, 0.0);
        h.game.tick(FRAME);
        assert!(h.game.session_score() > 50.0);

        h.slide(12.0, 0.6);
        h.game.tick(FRAME);
        h.game.reset_car();

        let body = h.game.car().body();
        assert_eq!(body.position, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
        assert!(h.game.effects().decals().is_blank());
        assert_eq!(h.game.session_score(), 0.0);
        assert_eq!(h.game.drift_state(), DriftState::default());
        assert_eq!(h.totals().last(), Some(&0.0));
        assert_eq!(h.last_drift_display(), Some(0.0));
        // the interrupted drift's skid sound is stopped
        assert_eq!(h.skid_calls().last(), Some(&AudioCall::SkidRelease));
    }

    #[test]
    fn test_teardown_is_final_and_idempotent() {
        let mut h = harness();
        h.game.set_control(Control::Handbrake, true);
        h.game.on_pointer_button(true);
        h.game.tick(FRAME);

        h.game.teardown();
        h.game.teardown();

        assert_eq!(h.game.lifecycle(), Lifecycle::TornDown);
        assert_eq!(*h.game.controls(), ControlState::default());
        assert!(!h.game.camera().is_rotating());
        assert_eq!(h.render.borrow().disposals, 1);
        assert_eq!(
            h.audio
                .borrow()
                .iter()
                .filter(|call| **call == AudioCall::Shutdown)
                .count(),
            1
        );

        // late callbacks and frames do nothing
        h.game.set_control(Control::Forward, true);
        h.game.resize(640, 480);
        h.game.reset_car();
        assert!(h.game.tick(FRAME).is_none());
        assert!(!h.game.controls().forward);
        assert_eq!(h.render.borrow().frames, 1);
        assert!(h.render.borrow().sizes.is_empty());
        assert_eq!(h.game.car().physics().steps, 1);
    }

    #[test]
    fn test_teardown_without_audio() {
        let settings = Settings::default();
        let (renderer, render) = CountingRenderer::new();
        let mut game = DriftGame::new(
            &settings,
            ScriptedVehicle::new(),
            AudioReactor::silent(),
            Box::new(crate::score::LatestScores::default()),
            Box::new(renderer),
        );

        game.teardown();
        assert_eq!(render.borrow().disposals, 1);
        assert!(!game.audio().is_started());
    }

    #[test]
    fn test_touch_drives_controls() {
        let mut h = harness();
        assert_eq!(h.game.touch_start(4, 0.88, 0.84), Some(Control::Handbrake));
        assert!(h.game.controls().handbrake);
        h.game.touch_end(4);
        assert!(!h.game.controls().handbrake);
    }

    #[test]
    fn test_release_inputs_drops_everything_held() {
        let mut h = harness();
        h.game.set_control(Control::Forward, true);
        h.game.touch_start(1, 0.88, 0.84);
        h.game.on_pointer_button(true);

        h.game.release_inputs();
        assert_eq!(*h.game.controls(), ControlState::default());
        assert!(!h.game.camera().is_rotating());
        // the released touch no longer holds anything
        assert_eq!(h.game.touch_end(1), None);
        assert!(h.game.is_running());
    }

    #[test]
    fn test_resize_reaches_renderer_and_camera() {
        let mut h = harness();
        h.game.resize(1000, 500);
        assert_eq!(h.render.borrow().sizes, vec![(1000, 500)]);
        assert_eq!(h.game.camera().aspect(), 2.0);
    }
}
