// Chassis: a 150 kg box, upright at all times.
pub const CHASSIS_MASS: f32 = 150.0;
pub const CHASSIS_HALF_EXTENTS: [f32; 3] = [2.0, 0.5, 1.0];

// Suspension and wheels. Stiffness and damping are per unit of chassis mass.
pub const WHEEL_RADIUS: f32 = 0.5;
pub const SUSPENSION_REST_LENGTH: f32 = 0.3;
pub const SUSPENSION_MAX_TRAVEL: f32 = 0.3;
pub const SUSPENSION_STIFFNESS: f32 = 30.0;
pub const DAMPING_RELAXATION: f32 = 2.3;
pub const DAMPING_COMPRESSION: f32 = 4.4;

// Front wheels first; the car points down -z so the front axle sits at z = -1.
pub const WHEEL_CONNECTIONS: [[f32; 3]; 4] = [
    [-1.5, 0.0, -1.0],
    [1.5, 0.0, -1.0],
    [-1.5, 0.0, 1.0],
    [1.5, 0.0, 1.0],
];

// Rolling resistance dominates at low-speed regimes and is proportional to
// velocity; drag dominates at higher speeds and is proportional to the square
// of velocity, so the rolling resistance coefficient must be much larger (~30x)
// than the drag coefficient
pub const DRAG_COEFFICIENT: f32 = 0.01;
pub const ROLLING_RESISTANCE_COEFFICIENT: f32 = 0.3;

pub const ROTATION_REDUCTION_COEFFICIENT: f32 = 0.98;

// brake input is scaled to newtons per wheel
pub const BRAKE_SCALE: f32 = 10.0;

pub const OBSTACLE_RESTITUTION: f32 = 0.5;
