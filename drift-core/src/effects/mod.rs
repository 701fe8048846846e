use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::drift::DriftReading;
use crate::settings::EffectsSettings;

mod particles;
mod skidmarks;

pub use particles::ParticleEmitter;
pub use skidmarks::{marks_to_rgba, SkidDecalBuffer};

// Smoke and skid marks for the two rear wheels.
pub struct EffectsCoordinator<R = StdRng> {
    emitters: [ParticleEmitter; 2],
    decals: SkidDecalBuffer,
    tuning: EffectsSettings,
    rng: R,
}

impl EffectsCoordinator<StdRng> {
    pub fn new(tuning: EffectsSettings) -> Self {
        Self::with_rng(tuning, StdRng::from_entropy())
    }
}

impl<R: Rng> EffectsCoordinator<R> {
    pub fn with_rng(tuning: EffectsSettings, mut rng: R) -> Self {
        let mut emitter = || {
            ParticleEmitter::new(
                tuning.particle_count,
                tuning.particle_bound,
                tuning.particle_speed,
                &mut rng,
            )
        };
        let emitters = [emitter(), emitter()];
        let decals = SkidDecalBuffer::new(tuning.decal_resolution, tuning.decal_world_extent);

        Self {
            emitters,
            decals,
            tuning,
            rng,
        }
    }

    pub fn emitters(&self) -> &[ParticleEmitter; 2] {
        &self.emitters
    }

    pub fn decals(&self) -> &SkidDecalBuffer {
        &self.decals
    }

    pub fn decals_mut(&mut self) -> &mut SkidDecalBuffer {
        &mut self.decals
    }

    // Smoke and marks need a proper slide, not just any drift.
    pub fn is_active(&self, reading: &DriftReading) -> bool {
        reading.drifting && reading.speed > self.tuning.min_speed
    }

    pub fn update(&mut self, reading: &DriftReading, rear_wheels: [Vec3; 2]) {
        let active = self.is_active(reading);
        let radius = self.tuning.decal_radius_scale * reading.angle;
        let opacity = self
            .tuning
            .decal_max_opacity
            .min(reading.angle * self.tuning.decal_opacity_scale);

        for (emitter, wheel) in self.emitters.iter_mut().zip(rear_wheels) {
            emitter.update(active, wheel, &mut self.rng);
            if active {
                self.decals.paint(wheel, radius, opacity);
            }
        }
    }

    pub fn clear_decals(&mut self) {
        self.decals.clear();
    }
}
