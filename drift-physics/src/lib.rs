pub mod physics;

pub use physics::{ArcadeWorld, CHASSIS_HALF_EXTENTS, WHEEL_RADIUS};
