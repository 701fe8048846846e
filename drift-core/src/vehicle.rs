use crate::pose::{BodyState, Pose};

pub const FRONT_LEFT: usize = 0;
pub const FRONT_RIGHT: usize = 1;
pub const REAR_LEFT: usize = 2;
pub const REAR_RIGHT: usize = 3;

pub const FRONT_WHEELS: [usize; 2] = [FRONT_LEFT, FRONT_RIGHT];
pub const REAR_WHEELS: [usize; 2] = [REAR_LEFT, REAR_RIGHT];

/*
 * The physics engine as seen from the game: a world holding a single
 * raycast vehicle. Wheels are indexed front-left, front-right, rear-left,
 * rear-right. Commands set through this trait persist until overwritten and
 * take effect on the next `step`. A car is expected to have four wheels;
 * implementations with fewer must ignore commands for the missing indices.
 */
pub trait VehiclePhysics {
    fn step(&mut self, dt: f32);

    fn body(&self) -> BodyState;
    fn set_body(&mut self, state: BodyState);

    fn wheel_count(&self) -> usize;
    fn set_steering(&mut self, angle: f32, wheel: usize);
    fn apply_engine_force(&mut self, force: f32, wheel: usize);
    fn set_brake(&mut self, force: f32, wheel: usize);
    fn friction_slip(&self, wheel: usize) -> f32;
    fn set_friction_slip(&mut self, friction: f32, wheel: usize);

    // Recomputes the wheel's world transform from the chassis and its
    // suspension travel.
    fn update_wheel_transform(&mut self, wheel: usize) -> Pose;
}

impl<P: VehiclePhysics + ?Sized> VehiclePhysics for Box<P> {
    fn step(&mut self, dt: f32) {
        (**self).step(dt)
    }
    fn body(&self) -> BodyState {
        (**self).body()
    }
    fn set_body(&mut self, state: BodyState) {
        (**self).set_body(state)
    }
    fn wheel_count(&self) -> usize {
        (**self).wheel_count()
    }
    fn set_steering(&mut self, angle: f32, wheel: usize) {
        (**self).set_steering(angle, wheel)
    }
    fn apply_engine_force(&mut self, force: f32, wheel: usize) {
        (**self).apply_engine_force(force, wheel)
    }
    fn set_brake(&mut self, force: f32, wheel: usize) {
        (**self).set_brake(force, wheel)
    }
    fn friction_slip(&self, wheel: usize) -> f32 {
        (**self).friction_slip(wheel)
    }
    fn set_friction_slip(&mut self, friction: f32, wheel: usize) {
        (**self).set_friction_slip(friction, wheel)
    }
    fn update_wheel_transform(&mut self, wheel: usize) -> Pose {
        (**self).update_wheel_transform(wheel)
    }
}
