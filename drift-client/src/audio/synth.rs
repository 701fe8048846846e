use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;

pub const SAMPLE_RATE: u32 = 44_100;

pub fn db_to_volume(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

// An f32 written by the game and read by the audio thread.
pub struct SharedF32(AtomicU32);

impl SharedF32 {
    pub fn new(value: f32) -> Self {
        SharedF32(AtomicU32::new(value.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }
}

/*
 * Knobs of a playing voice. While the gate is open the level moves toward
 * `sustain` with the attack time constant; once closed it falls back to
 * silence with the release one.
 */
pub struct VoiceControls {
    gate: AtomicBool,
    pub attack: SharedF32,
    pub release: SharedF32,
    pub sustain: f32,
    // low-pass cutoff in Hz, zero for unfiltered noise
    pub cutoff: SharedF32,
}

impl VoiceControls {
    pub fn new(attack: f32, release: f32, sustain: f32) -> Arc<Self> {
        Arc::new(VoiceControls {
            gate: AtomicBool::new(false),
            attack: SharedF32::new(attack),
            release: SharedF32::new(release),
            sustain,
            cutoff: SharedF32::new(0.0),
        })
    }

    pub fn open(&self) {
        self.gate.store(true, Ordering::Relaxed);
    }

    pub fn close(&self) {
        self.gate.store(false, Ordering::Relaxed);
    }

    pub fn is_open(&self) -> bool {
        self.gate.load(Ordering::Relaxed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoiseColor {
    White,
    Brown,
}

pub struct NoiseVoice {
    color: NoiseColor,
    rng: StdRng,
    brown: f32,
    filtered: f32,
    level: f32,
    controls: Arc<VoiceControls>,
}

impl NoiseVoice {
    pub fn new(color: NoiseColor, controls: Arc<VoiceControls>) -> Self {
        Self::with_rng(color, controls, StdRng::from_entropy())
    }

    pub fn with_rng(color: NoiseColor, controls: Arc<VoiceControls>, rng: StdRng) -> Self {
        NoiseVoice {
            color,
            rng,
            brown: 0.0,
            filtered: 0.0,
            level: 0.0,
            controls,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    fn advance_envelope(&mut self) {
        let (target, time) = if self.controls.is_open() {
            (self.controls.sustain, self.controls.attack.get())
        } else {
            (0.0, self.controls.release.get())
        };
        let coefficient = 1.0 - (-1.0 / (time.max(1e-3) * SAMPLE_RATE as f32)).exp();
        self.level += (target - self.level) * coefficient;
    }
}

impl Iterator for NoiseVoice {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        let mut sample = match self.color {
            NoiseColor::White => white,
            // leaky integrator over white noise
            NoiseColor::Brown => {
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * 3.5
            }
        };

        let cutoff = self.controls.cutoff.get();
        if cutoff > 0.0 {
            let alpha = 1.0 - (-TAU * cutoff / SAMPLE_RATE as f32).exp();
            self.filtered += alpha * (sample - self.filtered);
            sample = self.filtered;
        }

        self.advance_envelope();
        Some(sample * self.level)
    }
}

impl Source for NoiseVoice {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn channels(&self) -> u16 {
        1
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    #[inline]
    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

// C3 E3 G3 B3 C4 B3 G3 E3
pub const ARPEGGIO_NOTES: [f32; 8] = [
    130.81, 164.81, 196.00, 246.94, 261.63, 246.94, 196.00, 164.81,
];

// Walks forward through `len` notes and back again without repeating the
// turning points: 0 1 2 .. len-1 len-2 .. 1 0 1 ..
pub fn up_down_index(step: usize, len: usize) -> usize {
    if len < 2 {
        return 0;
    }
    let period = 2 * (len - 1);
    let position = step % period;
    if position < len {
        position
    } else {
        period - position
    }
}

/*
 * Background music: a square-wave arpeggio, one note per quarter at 120 bpm,
 * each held for an eighth and then let ring out.
 */
pub struct Arpeggio {
    sample_index: u64,
    phase: f32,
}

impl Arpeggio {
    const NOTE_SECONDS: f32 = 0.5;
    const GATE_SECONDS: f32 = 0.25;
    const ATTACK: f32 = 0.01;
    const DECAY: f32 = 0.1;
    const SUSTAIN: f32 = 0.3;
    const RELEASE: f32 = 1.0;

    pub fn new() -> Self {
        Arpeggio {
            sample_index: 0,
            phase: 0.0,
        }
    }

    fn note_samples() -> u64 {
        (Self::NOTE_SECONDS * SAMPLE_RATE as f32) as u64
    }

    pub fn current_note(&self) -> f32 {
        let step = (self.sample_index / Self::note_samples()) as usize;
        ARPEGGIO_NOTES[up_down_index(step, ARPEGGIO_NOTES.len())]
    }

    pub fn envelope(&self) -> f32 {
        let t = (self.sample_index % Self::note_samples()) as f32 / SAMPLE_RATE as f32;
        if t < Self::ATTACK {
            t / Self::ATTACK
        } else if t < Self::ATTACK + Self::DECAY {
            let decayed = (t - Self::ATTACK) / Self::DECAY;
            1.0 + (Self::SUSTAIN - 1.0) * decayed
        } else if t < Self::GATE_SECONDS {
            Self::SUSTAIN
        } else {
            Self::SUSTAIN * (-(t - Self::GATE_SECONDS) * 5.0 / Self::RELEASE).exp()
        }
    }
}

impl Default for Arpeggio {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Arpeggio {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let square = if self.phase < 0.5 { 1.0 } else { -1.0 };
        let sample = square * self.envelope();

        self.phase = (self.phase + self.current_note() / SAMPLE_RATE as f32).fract();
        self.sample_index += 1;
        Some(sample)
    }
}

impl Source for Arpeggio {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn channels(&self) -> u16 {
        1
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    #[inline]
    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
