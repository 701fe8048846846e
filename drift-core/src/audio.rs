use tracing::{info, warn};

use crate::error::AudioError;

const MIN_ENGINE_PITCH: f32 = 200.0;
const MAX_ENGINE_PITCH: f32 = 1200.0;

// Engine voice parameters for a given car speed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineSoundParams {
    pub pitch: f32,
    pub attack: f32,
    pub playback_rate: f32,
}

impl EngineSoundParams {
    pub fn for_speed(speed: f32) -> Self {
        Self {
            pitch: MIN_ENGINE_PITCH + (speed / 50.0) * (MAX_ENGINE_PITCH - MIN_ENGINE_PITCH),
            attack: f32::max(0.01, 1.0 - speed / 30.0),
            playback_rate: (speed / 15.0).clamp(0.5, 2.5),
        }
    }
}

// The synthesizer behind the reactor. `start` may fail (no output device);
// the other calls are only made after a successful start.
pub trait AudioBackend {
    fn start(&mut self) -> Result<(), AudioError>;
    fn set_engine(&mut self, params: EngineSoundParams);
    fn skid_attack(&mut self);
    fn skid_release(&mut self);
    fn shutdown(&mut self);
}

// Stand-in for machines without sound.
#[derive(Default)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
    fn set_engine(&mut self, _params: EngineSoundParams) {}
    fn skid_attack(&mut self) {}
    fn skid_release(&mut self) {}
    fn shutdown(&mut self) {}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioPhase {
    Constructed,
    Started,
    Stopped,
}

/*
 * Game-facing side of the audio. Sound can only begin after a user gesture,
 * so the reactor starts out `Constructed` and every call except
 * `start_music` does nothing until the backend has started. After
 * `stop_all` it stays silent for good.
 */
pub struct AudioReactor {
    backend: Box<dyn AudioBackend>,
    phase: AudioPhase,
    skidding: bool,
}

impl AudioReactor {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            phase: AudioPhase::Constructed,
            skidding: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentBackend))
    }

    pub fn phase(&self) -> AudioPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase == AudioPhase::Started
    }

    pub fn start_music(&mut self) -> Result<(), AudioError> {
        if self.phase != AudioPhase::Constructed {
            return Ok(());
        }

        match self.backend.start() {
            Ok(()) => {
                self.phase = AudioPhase::Started;
                info!("audio started");
                Ok(())
            }
            Err(err) => {
                warn!("audio failed to start: {}", err);
                Err(err)
            }
        }
    }

    pub fn update_engine_sound(&mut self, speed: f32) {
        if self.is_started() {
            self.backend.set_engine(EngineSoundParams::for_speed(speed));
        }
    }

    pub fn play_skid_sound(&mut self) {
        if self.is_started() && !self.skidding {
            self.skidding = true;
            self.backend.skid_attack();
        }
    }

    pub fn stop_skid_sound(&mut self) {
        if self.is_started() && self.skidding {
            self.skidding = false;
            self.backend.skid_release();
        }
    }

    pub fn stop_all(&mut self) {
        if self.is_started() {
            self.backend.shutdown();
            info!("audio stopped");
        }
        self.skidding = false;
        self.phase = AudioPhase::Stopped;
    }
}
