use glam::{Quat, Vec3};

use crate::physics::constants::*;

// Per-wheel inputs and the suspension state from the last step.
#[derive(Copy, Clone, Debug)]
pub struct Wheel {
    pub connection: Vec3,
    pub steering: f32,
    pub engine_force: f32,
    pub brake: f32,
    pub friction_slip: f32,

    pub suspension_length: f32,
    pub suspension_force: f32,
    pub in_contact: bool,
    // accumulated roll about the axle, for drawing only
    pub rotation: f32,
}

impl Wheel {
    pub fn new(connection: Vec3, friction_slip: f32) -> Wheel {
        Wheel {
            connection,
            steering: 0.0,
            engine_force: 0.0,
            brake: 0.0,
            friction_slip,
            suspension_length: SUSPENSION_REST_LENGTH,
            suspension_force: 0.0,
            in_contact: false,
            rotation: 0.0,
        }
    }

    // Where the wheel is mounted on the chassis, in world space.
    pub fn mount_point(&self, position: Vec3, orientation: Quat) -> Vec3 {
        position + orientation * self.connection
    }

    // The direction the wheel rolls in when the car drives forward.
    pub fn forward(&self, orientation: Quat) -> Vec3 {
        orientation * Quat::from_rotation_y(self.steering) * -Vec3::Z
    }

    // Casts straight down from the mount point onto the ground plane and
    // works out the spring and damper force. `vertical_speed` is the speed of
    // the mount point along +y.
    pub fn update_suspension(&mut self, mount_height: f32, vertical_speed: f32) {
        let max_length = SUSPENSION_REST_LENGTH + SUSPENSION_MAX_TRAVEL;
        let hit_distance = mount_height - WHEEL_RADIUS;

        if hit_distance > max_length {
            self.in_contact = false;
            self.suspension_length = max_length;
            self.suspension_force = 0.0;
            return;
        }

        self.in_contact = true;
        self.suspension_length = hit_distance.clamp(
            SUSPENSION_REST_LENGTH - SUSPENSION_MAX_TRAVEL,
            max_length,
        );

        let compression = SUSPENSION_REST_LENGTH - self.suspension_length;
        let damping = if vertical_speed < 0.0 {
            DAMPING_COMPRESSION
        } else {
            DAMPING_RELAXATION
        };
        let force = (SUSPENSION_STIFFNESS * compression - damping * vertical_speed) * CHASSIS_MASS;

        // a spring can push the car up but never pull it down
        self.suspension_force = force.max(0.0);
    }

    pub fn hub(&self, position: Vec3, orientation: Quat) -> Vec3 {
        self.mount_point(position, orientation) - Vec3::Y * self.suspension_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airborne_wheel_has_no_force() {
        let mut wheel = Wheel::new(Vec3::ZERO, 5.0);
        wheel.update_suspension(3.0, -4.0);
        assert!(!wheel.in_contact);
        assert_eq!(wheel.suspension_force, 0.0);
    }

    #[test]
    fn test_compressed_spring_pushes_up() {
        let mut wheel = Wheel::new(Vec3::ZERO, 5.0);
        // mount 0.7 above ground leaves 0.2 of spring: 0.1 of compression
        wheel.update_suspension(0.7, 0.0);
        assert!(wheel.in_contact);
        assert!((wheel.suspension_length - 0.2).abs() < 1e-5);
        assert!((wheel.suspension_force - 30.0 * 0.1 * 150.0).abs() < 1e-2);
    }

    #[test]
    fn test_relaxing_spring_never_pulls() {
        let mut wheel = Wheel::new(Vec3::ZERO, 5.0);
        wheel.update_suspension(0.79, 5.0);
        assert!(wheel.in_contact);
        assert_eq!(wheel.suspension_force, 0.0);
    }
}
