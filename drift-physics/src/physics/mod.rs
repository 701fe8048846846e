use glam::{Quat, Vec3};
use tracing::{debug, info};

use drift_core::pose::{BodyState, Pose};
use drift_core::settings::Settings;
use drift_core::vehicle::VehiclePhysics;

mod bounding_box;
mod constants;
mod wheel;


pub use bounding_box::BoundingBox;
use wheel::Wheel;
pub use constants::{CHASSIS_HALF_EXTENTS, WHEEL_RADIUS};

use constants::*;

/*
 * A flat world with a few static boxes and one raycast car. The chassis is
 * kept upright and only yaws; each wheel casts down onto the ground plane,
 * pushes back with a damped spring, and grips the ground with a tyre force
 * no larger than its friction slip times the load it carries.
 */
pub struct ArcadeWorld {
    body: BodyState,
    wheels: Vec<Wheel>,
    gravity: f32,
    obstacles: Vec<BoundingBox>,
}

impl ArcadeWorld {
    pub fn new(settings: &Settings) -> ArcadeWorld {
        let world = &settings.world;

        let obstacles = world
            .obstacles
            .iter()
            .map(|center| {
                BoundingBox::from_center(Vec3::from(*center), Vec3::splat(world.obstacle_half_extent))
            })
            .collect::<Vec<_>>();

        let wheels = WHEEL_CONNECTIONS
            .iter()
            .map(|connection| Wheel::new(Vec3::from(*connection), settings.dynamics.nominal_friction))
            .collect();

        info!("physics world created with {} obstacles", obstacles.len());
        ArcadeWorld {
            body: BodyState::at_rest(Vec3::from(world.spawn_point)),
            wheels,
            gravity: world.gravity,
            obstacles,
        }
    }

    pub fn obstacles(&self) -> &[BoundingBox] {
        &self.obstacles
    }

    pub fn is_grounded(&self) -> bool {
        self.wheels.iter().any(|wheel| wheel.in_contact)
    }

    // Heading about +y, zero when the car faces -z.
    pub fn yaw(&self) -> f32 {
        let forward = self.body.orientation * -Vec3::Z;
        (-forward.x).atan2(-forward.z)
    }

    pub fn chassis_bounds(&self) -> BoundingBox {
        BoundingBox::around_yawed_box(
            self.body.position,
            Vec3::from(CHASSIS_HALF_EXTENTS),
            self.yaw(),
        )
    }

    fn yaw_inertia() -> f32 {
        let [x, _, z] = CHASSIS_HALF_EXTENTS;
        CHASSIS_MASS / 3.0 * (x * x + z * z)
    }

    // Sum of tyre forces and the yaw torque they produce.
    fn tyre_forces(&mut self, dt: f32) -> (Vec3, f32) {
        let BodyState {
            orientation,
            linear_velocity,
            angular_velocity,
            ..
        } = self.body;
        let wheel_share = CHASSIS_MASS / self.wheels.len() as f32;

        let mut force = Vec3::ZERO;
        let mut torque = 0.0;
        for wheel in &mut self.wheels {
            let arm = orientation * wheel.connection;
            let contact_velocity = linear_velocity + angular_velocity.cross(arm);
            let forward = wheel.forward(orientation);
            let side = forward.cross(Vec3::Y);

            let forward_speed = contact_velocity.dot(forward);
            wheel.rotation += forward_speed / WHEEL_RADIUS * dt;
            if !wheel.in_contact {
                continue;
            }

            // engine force acts along the axle's +z, so negative drives forward
            let mut tyre = -forward * wheel.engine_force;

            let brake_limit = wheel.brake * BRAKE_SCALE;
            tyre += forward * (-forward_speed * wheel_share / dt).clamp(-brake_limit, brake_limit);

            // grip tries to cancel all sideways sliding within the step
            let side_speed = contact_velocity.dot(side);
            tyre += side * (-side_speed * wheel_share / dt);

            let grip = wheel.friction_slip * wheel.suspension_force;
            let magnitude = tyre.length();
            if magnitude > grip {
                tyre *= grip / magnitude;
            }

            force += tyre;
            torque += arm.cross(tyre).y;
        }

        (force, torque)
    }

    fn resolve_obstacles(&mut self) {
        for obstacle in &self.obstacles {
            let chassis = self.chassis_bounds();
            if !chassis.is_colliding(obstacle) {
                continue;
            }

            let push = chassis.horizontal_push_out(obstacle);
            self.body.position += push;

            // We want to "reflect" off of objects: only the velocity going into
            // the face we hit bounces back, and only half of it survives
            let normal = push.normalize_or_zero();
            let into = self.body.linear_velocity.dot(normal);
            if into < 0.0 {
                self.body.linear_velocity -= normal * into * (1.0 + OBSTACLE_RESTITUTION);
                debug!("bounced off obstacle at {:?}", obstacle.pos());
            }
        }
    }
}

impl VehiclePhysics for ArcadeWorld {
    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let mut force = Vec3::Y * self.gravity * CHASSIS_MASS;
        for wheel in &mut self.wheels {
            let mount = wheel.mount_point(self.body.position, self.body.orientation);
            wheel.update_suspension(mount.y, self.body.linear_velocity.y);
            force.y += wheel.suspension_force;
        }

        let (tyre_force, torque) = self.tyre_forces(dt);
        force += tyre_force;

        // Equations for modelling air resistance and rolling resistance come from
        // https://asawicki.info/Mirror/Car%20Physics%20for%20Games/Car%20Physics%20for%20Games.html
        let velocity = self.body.linear_velocity;
        if self.is_grounded() {
            let rolling = Vec3::new(velocity.x, 0.0, velocity.z);
            force -= rolling * CHASSIS_MASS * ROLLING_RESISTANCE_COEFFICIENT;
        }
        force -= velocity * velocity.length() * CHASSIS_MASS * DRAG_COEFFICIENT;

        let mut velocity = velocity + force / CHASSIS_MASS * dt;
        let yaw_rate = (self.body.angular_velocity.y + torque / Self::yaw_inertia() * dt)
            * ROTATION_REDUCTION_COEFFICIENT;

        let mut position = self.body.position + velocity * dt;
        let orientation = (Quat::from_rotation_y(yaw_rate * dt) * self.body.orientation).normalize();

        // the chassis can bottom out but never sink through the ground
        let floor = CHASSIS_HALF_EXTENTS[1];
        if position.y < floor {
            position.y = floor;
            velocity.y = velocity.y.max(0.0);
        }

        self.body = BodyState {
            position,
            orientation,
            linear_velocity: velocity,
            angular_velocity: Vec3::Y * yaw_rate,
        };
        self.resolve_obstacles();
    }

    fn body(&self) -> BodyState {
        self.body
    }

    fn set_body(&mut self, state: BodyState) {
        self.body = state;
    }

    fn wheel_count(&self) -> usize {
        self.wheels.len()
    }

    fn set_steering(&mut self, angle: f32, wheel: usize) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.steering = angle;
        }
    }

    fn apply_engine_force(&mut self, force: f32, wheel: usize) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.engine_force = force;
        }
    }

    fn set_brake(&mut self, force: f32, wheel: usize) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.brake = force;
        }
    }

    fn friction_slip(&self, wheel: usize) -> f32 {
        self.wheels.get(wheel).map_or(0.0, |wheel| wheel.friction_slip)
    }

    fn set_friction_slip(&mut self, friction: f32, wheel: usize) {
        if let Some(wheel) = self.wheels.get_mut(wheel) {
            wheel.friction_slip = friction;
        }
    }

    fn update_wheel_transform(&mut self, wheel: usize) -> Pose {
        let BodyState {
            position,
            orientation,
            ..
        } = self.body;

        self.wheels.get(wheel).map_or(Pose::IDENTITY, |wheel| {
            Pose::new(
                wheel.hub(position, orientation),
                orientation
                    * Quat::from_rotation_y(wheel.steering)
                    * Quat::from_rotation_x(wheel.rotation),
            )
        })
    }
}
