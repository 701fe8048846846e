use std::sync::Arc;

use rodio::Sink;
use tracing::info;

use drift_core::audio::{AudioBackend, EngineSoundParams};
use drift_core::error::AudioError;

pub mod context;
pub mod synth;

use context::AudioCtx;
use synth::{db_to_volume, Arpeggio, NoiseColor, NoiseVoice, VoiceControls};

const MUSIC_DB: f32 = -14.0;
const ENGINE_DB: f32 = -25.0;
const SKID_DB: f32 = -10.0;

// Everything that only exists once the output device is open.
struct Voices {
    _ctx: AudioCtx,
    music: Sink,
    engine: Sink,
    engine_controls: Arc<VoiceControls>,
    skid: Sink,
    skid_controls: Arc<VoiceControls>,
}

impl Voices {
    fn open() -> Result<Voices, AudioError> {
        let ctx = AudioCtx::new()?;

        let music = ctx.sink(db_to_volume(MUSIC_DB))?;
        music.append(Arpeggio::new());

        // the engine drones from the start; speed only reshapes it
        let engine_controls = VoiceControls::new(1.0, 0.2, 1.0);
        engine_controls.open();
        let engine = ctx.sink(db_to_volume(ENGINE_DB))?;
        engine.append(NoiseVoice::new(NoiseColor::Brown, Arc::clone(&engine_controls)));

        let skid_controls = VoiceControls::new(0.05, 0.5, 0.8);
        let skid = ctx.sink(db_to_volume(SKID_DB))?;
        skid.append(NoiseVoice::new(NoiseColor::White, Arc::clone(&skid_controls)));

        Ok(Voices {
            _ctx: ctx,
            music,
            engine,
            engine_controls,
            skid,
            skid_controls,
        })
    }
}

// Synthesized game audio played through rodio.
#[derive(Default)]
pub struct RodioAudio {
    voices: Option<Voices>,
}

impl RodioAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for RodioAudio {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.voices.is_none() {
            self.voices = Some(Voices::open()?);
            info!("audio output opened");
        }
        Ok(())
    }

    fn set_engine(&mut self, params: EngineSoundParams) {
        if let Some(voices) = &self.voices {
            voices.engine_controls.cutoff.set(params.pitch);
            voices.engine_controls.attack.set(params.attack);
            voices.engine.set_speed(params.playback_rate);
        }
    }

    fn skid_attack(&mut self) {
        if let Some(voices) = &self.voices {
            voices.skid_controls.open();
        }
    }

    fn skid_release(&mut self) {
        if let Some(voices) = &self.voices {
            voices.skid_controls.close();
        }
    }

    fn shutdown(&mut self) {
        if let Some(voices) = self.voices.take() {
            voices.music.stop();
            voices.engine.stop();
            voices.skid.stop();
            info!("audio output closed");
        }
    }
}
