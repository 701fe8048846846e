use glam::Vec3;

use crate::controls::ControlState;
use crate::pose::{BodyState, Pose};
use crate::settings::DynamicsSettings;
use crate::vehicle::{VehiclePhysics, FRONT_WHEELS, REAR_WHEELS};

// What the controller asks of the vehicle for one tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriveCommand {
    pub engine_force: f32,
    pub steering: f32,
    pub brake: f32,
    pub rear_friction: f32,
}

impl DriveCommand {
    pub fn from_controls(controls: &ControlState, tuning: &DynamicsSettings) -> DriveCommand {
        // forward pushes along -z, so the forward force is negative; reverse
        // only gets half the force
        let engine_force = match (controls.forward, controls.backward) {
            (true, false) => -tuning.max_force,
            (false, true) => tuning.max_force / 2.0,
            _ => 0.0,
        };

        let steering = match (controls.left, controls.right) {
            (true, false) => tuning.max_steer,
            (false, true) => -tuning.max_steer,
            _ => 0.0,
        };

        let (brake, rear_friction) = if controls.handbrake {
            (tuning.brake_force, tuning.slip_friction)
        } else {
            (0.0, tuning.nominal_friction)
        };

        DriveCommand {
            engine_force,
            steering,
            brake,
            rear_friction,
        }
    }
}

/*
 * The car aggregate: the physics vehicle together with the poses the visual
 * chassis and wheels were last synced to. Everything outside reads the car
 * through these accessors instead of poking at the physics handle.
 */
pub struct Car<P> {
    physics: P,
    chassis: Pose,
    wheels: Vec<Pose>,
}

impl<P: VehiclePhysics> Car<P> {
    pub fn new(physics: P) -> Self {
        let wheels = vec![Pose::IDENTITY; physics.wheel_count()];
        let chassis = physics.body().pose();
        Self {
            physics,
            chassis,
            wheels,
        }
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn body(&self) -> BodyState {
        self.physics.body()
    }

    // Pose of the visual chassis as of the last sync.
    pub fn chassis_pose(&self) -> Pose {
        self.chassis
    }

    // Falls back to the chassis pose for a wheel the physics doesn't have.
    pub fn wheel_pose(&self, wheel: usize) -> Pose {
        self.wheels.get(wheel).copied().unwrap_or(self.chassis)
    }

    pub fn wheel_poses(&self) -> &[Pose] {
        &self.wheels
    }

    pub fn step(&mut self, dt: f32) {
        self.physics.step(dt);
    }

    // Copies the physics state onto the visual chassis and wheels.
    pub fn sync_poses(&mut self) {
        self.chassis = self.physics.body().pose();
        for wheel in 0..self.wheels.len() {
            self.wheels[wheel] = self.physics.update_wheel_transform(wheel);
        }
    }

    pub fn reset(&mut self, spawn_point: Vec3) {
        self.physics.set_body(BodyState::at_rest(spawn_point));
        self.sync_poses();
    }
}

pub struct DynamicsController<P> {
    car: Car<P>,
    tuning: DynamicsSettings,
    last_command: Option<DriveCommand>,
}

impl<P: VehiclePhysics> DynamicsController<P> {
    pub fn new(physics: P, tuning: DynamicsSettings) -> Self {
        Self {
            car: Car::new(physics),
            tuning,
            last_command: None,
        }
    }

    pub fn car(&self) -> &Car<P> {
        &self.car
    }

    pub fn car_mut(&mut self) -> &mut Car<P> {
        &mut self.car
    }

    pub fn last_command(&self) -> Option<DriveCommand> {
        self.last_command
    }

    // Front-wheel drive and steering; the handbrake locks up and loosens the
    // rear axle.
    pub fn apply(&mut self, controls: &ControlState) -> DriveCommand {
        let command = DriveCommand::from_controls(controls, &self.tuning);
        let physics = self.car.physics_mut();

        for wheel in FRONT_WHEELS {
            physics.set_steering(command.steering, wheel);
            physics.apply_engine_force(command.engine_force, wheel);
        }

        for wheel in REAR_WHEELS {
            physics.set_brake(command.brake, wheel);
            physics.set_friction_slip(command.rear_friction, wheel);
        }

        self.last_command = Some(command);
        command
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::controls::Control;
    use crate::fakes::ScriptedVehicle;

    fn command_for(pressed: &[Control]) -> DriveCommand {
        let mut controls = ControlState::new();
        for control in pressed {
            controls.set(*control, true);
        }
        DriveCommand::from_controls(&controls, &DynamicsSettings::default())
    }

    #[test]
    fn test_engine_force_sign() {
        assert_eq!(command_for(&[Control::Forward]).engine_force, -1000.0);
        assert_eq!(command_for(&[Control::Backward]).engine_force, 500.0);
        assert_eq!(
            command_for(&[Control::Forward, Control::Backward]).engine_force,
            0.0
        );
        assert_eq!(command_for(&[]).engine_force, 0.0);
    }

    #[test]
    fn test_steering_cancels() {
        assert_eq!(command_for(&[Control::Left]).steering, 0.5);
        assert_eq!(command_for(&[Control::Right]).steering, -0.5);
        assert_eq!(command_for(&[Control::Left, Control::Right]).steering, 0.0);
    }

    #[test]
    fn test_handbrake_loosens_rear_axle() {
        let mut controller =
            DynamicsController::new(ScriptedVehicle::new(), DynamicsSettings::default());

        let mut controls = ControlState::new();
        controls.set(Control::Handbrake, true);
        controls.set(Control::Forward, true);
        controller.apply(&controls);

        let physics = controller.car().physics();
        assert_eq!(physics.brakes, [0.0, 0.0, 100.0, 100.0]);
        assert_eq!(physics.frictions, [5.0, 5.0, 0.5, 0.5]);
        // front-wheel drive: rear wheels never receive engine force
        assert_eq!(physics.engine_forces, [-1000.0, -1000.0, 0.0, 0.0]);

        controls.set(Control::Handbrake, false);
        controller.apply(&controls);

        let physics = controller.car().physics();
        assert_eq!(physics.brakes, [0.0; 4]);
        assert_eq!(physics.frictions, [5.0; 4]);
    }

    #[test]
    fn test_steering_only_reaches_front_wheels() {
        let mut controller =
            DynamicsController::new(ScriptedVehicle::new(), DynamicsSettings::default());

        let mut controls = ControlState::new();
        controls.set(Control::Left, true);
        let command = controller.apply(&controls);

        assert_eq!(command.steering, 0.5);
        assert_eq!(controller.car().physics().steering, [0.5, 0.5, 0.0, 0.0]);
        assert_eq!(controller.last_command(), Some(command));
    }

    #[test]
    fn test_missing_wheels_fall_back_to_chassis() {
        let mut physics = ScriptedVehicle::new();
        physics.wheel_count = 2;

        let mut car = Car::new(physics);
        car.sync_poses();

        assert_eq!(car.wheel_poses().len(), 2);
        assert_eq!(car.wheel_pose(REAR_WHEELS[0]), car.chassis_pose());
        assert_eq!(car.wheel_pose(REAR_WHEELS[1]), car.chassis_pose());
        assert_ne!(car.wheel_pose(FRONT_WHEELS[0]), car.chassis_pose());
    }

    #[test]
    fn test_reset_puts_car_at_rest() {
        let mut physics = ScriptedVehicle::new();
        physics.body.position = Vec3::new(10.0, 1.0, -30.0);
        physics.body.linear_velocity = Vec3::new(5.0, 0.0, 3.0);
        physics.body.angular_velocity = Vec3::new(0.0, 2.0, 0.0);
        physics.body.orientation = Quat::from_rotation_y(1.2);

        let mut car = Car::new(physics);
        car.reset(Vec3::new(0.0, 4.0, 0.0));

        let body = car.body();
        assert_eq!(body.position, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
        assert_eq!(body.orientation, Quat::IDENTITY);
        assert_eq!(car.chassis_pose().position, Vec3::new(0.0, 4.0, 0.0));
    }
}
