use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};

use crate::settings::CameraSettings;

// Where the camera is and what it looks at, as the renderer needs it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/*
 * Chase camera. It trails the car at a fixed offset that the player can swing
 * around the car by dragging horizontally, and eases toward that spot a
 * fraction of the way every tick so that sudden moves of the car are
 * smoothed out. The drag accumulator is never wrapped: it only ever goes
 * through sin/cos.
 */
pub struct CameraRig {
    position: Vec3,
    target: Vec3,
    drag: f32,
    rotating: bool,
    aspect: f32,
    tuning: CameraSettings,
}

impl CameraRig {
    pub fn new(tuning: CameraSettings) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            drag: 0.0,
            rotating: false,
            aspect: 16.0 / 9.0,
            tuning,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn on_pointer_button(&mut self, pressed: bool) {
        self.rotating = pressed;
    }

    // Horizontal pointer movement in pixels; ignored unless the rotate
    // button is held.
    pub fn on_pointer_motion(&mut self, dx: f64) {
        if self.rotating {
            self.drag += dx as f32 * self.tuning.drag_sensitivity;
        }
    }

    pub fn desired_position(&self, car_position: Vec3) -> Vec3 {
        let yaw = Quat::from_rotation_y(self.drag * 2.0 * PI);
        car_position + yaw * Vec3::from(self.tuning.offset)
    }

    pub fn update(&mut self, car_position: Vec3) -> CameraPose {
        let desired = self.desired_position(car_position);
        self.position = self.position.lerp(desired, self.tuning.lerp_factor);
        self.target = car_position;
        self.pose()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.tuning.fov_degrees.to_radians(),
            self.aspect,
            self.tuning.near,
            self.tuning.far,
        )
    }
}
