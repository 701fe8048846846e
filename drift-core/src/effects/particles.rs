use glam::Vec3;
use rand::Rng;

fn sample_velocity<R: Rng + ?Sized>(rng: &mut R, speed: f32) -> Vec3 {
    // sideways spread is centred on zero, vertical drift never goes below it
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * speed,
        rng.gen::<f32>() * speed,
        (rng.gen::<f32>() - 0.5) * speed,
    )
}

/*
 * Tyre smoke behind one wheel. The pool is allocated once: particles that
 * wander past `bound` on any axis are sent back to the emitter origin with a
 * fresh velocity instead of being freed, so the particle count never
 * changes. Positions are relative to `anchor`, which follows the wheel.
 */
pub struct ParticleEmitter {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    anchor: Vec3,
    visible: bool,
    bound: f32,
    speed: f32,
}

impl ParticleEmitter {
    pub fn new<R: Rng + ?Sized>(count: usize, bound: f32, speed: f32, rng: &mut R) -> Self {
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                ) * 0.1
            })
            .collect();
        let velocities = (0..count).map(|_| sample_velocity(rng, speed)).collect();

        Self {
            positions,
            velocities,
            anchor: Vec3::ZERO,
            visible: false,
            bound,
            speed,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    // Positions relative to the anchor.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions.iter().map(move |local| self.anchor + *local)
    }

    // A hidden emitter keeps its particles exactly where they were.
    pub fn update<R: Rng + ?Sized>(&mut self, emitting: bool, wheel_position: Vec3, rng: &mut R) {
        self.visible = emitting;
        if !emitting {
            return;
        }

        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity;

            if position.abs().max_element() >= self.bound {
                *position = Vec3::ZERO;
                *velocity = sample_velocity(rng, self.speed);
            }
        }
        self.anchor = wheel_position;
    }
}
