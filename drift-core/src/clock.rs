use std::time::{Duration, Instant};

use crate::settings::{ClockSettings, TimestepMode};

/*
 * Decides how many fixed physics steps a frame gets and when the next frame
 * is due. By default every frame advances the world by exactly one timestep,
 * which ties game speed to frame rate; `Accumulated` instead banks real
 * elapsed time and pays it out in whole timesteps, capped per frame so a long
 * stall cannot snowball.
 */
pub struct SimulationClock {
    timestep: f32,
    mode: TimestepMode,
    max_steps: u32,
    accumulator: f32,
    frame_interval: Duration,
    frames: u64,
    running: bool,
}

impl SimulationClock {
    pub fn new(settings: &ClockSettings) -> Self {
        Self {
            timestep: settings.timestep,
            mode: settings.timestep_mode,
            max_steps: settings.max_steps_per_frame.max(1),
            accumulator: 0.0,
            frame_interval: Duration::from_secs_f64(1.0 / settings.frames_per_second.max(1) as f64),
            frames: 0,
            running: true,
        }
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn halt(&mut self) {
        self.running = false;
    }

    // Called once at the top of every frame with the wall time since the
    // previous one.
    pub fn begin_frame(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.frames += 1;

        match self.mode {
            TimestepMode::PerFrame => 1,
            TimestepMode::Accumulated => {
                self.accumulator += elapsed.as_secs_f32();
                let steps = ((self.accumulator / self.timestep) as u32).min(self.max_steps);
                self.accumulator -= steps as f32 * self.timestep;
                if steps == self.max_steps {
                    // drop whatever we could not catch up on
                    self.accumulator = self.accumulator.min(self.timestep);
                }
                steps
            }
        }
    }

    pub fn next_deadline(&self, frame_start: Instant) -> Instant {
        frame_start + self.frame_interval
    }
}
