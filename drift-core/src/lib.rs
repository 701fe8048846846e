pub mod audio;
pub mod camera;
pub mod clock;
pub mod controls;
pub mod drift;
pub mod dynamics;
pub mod effects;
pub mod error;
pub mod game;
pub mod pose;
pub mod render;
pub mod score;
pub mod settings;
pub mod touch;
pub mod vehicle;

#[cfg(test)]
mod fakes;

pub use settings::GLOBAL_CONFIG;
