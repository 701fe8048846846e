use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::warn;

use crate::error::DriftError;

// Every tunable of the game lives here; all of it can be overridden from
// drift.yaml or DRIFT__<SECTION>__<KEY> environment variables.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub dynamics: DynamicsSettings,
    pub drift: DriftSettings,
    pub effects: EffectsSettings,
    pub camera: CameraSettings,
    pub clock: ClockSettings,
    pub world: WorldSettings,
    pub skidmark_dump_path: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DynamicsSettings {
    pub max_force: f32,
    pub max_steer: f32,
    pub brake_force: f32,
    pub nominal_friction: f32,
    pub slip_friction: f32,
}

impl Default for DynamicsSettings {
    fn default() -> Self {
        Self {
            max_force: 1000.0,
            max_steer: 0.5,
            brake_force: 100.0,
            nominal_friction: 5.0,
            slip_friction: 0.5,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DriftSettings {
    pub min_speed: f32,
    pub min_angle: f32,
    pub handbrake_speed: f32,
    pub credit_threshold: f32,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            min_speed: 5.0,
            min_angle: 0.4,
            handbrake_speed: 8.0,
            credit_threshold: 50.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EffectsSettings {
    pub min_speed: f32,
    pub particle_count: usize,
    pub particle_bound: f32,
    pub particle_speed: f32,
    pub decal_resolution: u32,
    pub decal_world_extent: f32,
    pub decal_radius_scale: f32,
    pub decal_opacity_scale: f32,
    pub decal_max_opacity: f32,
}

impl Default for EffectsSettings {
    fn default() -> Self {
        Self {
            min_speed: 8.0,
            particle_count: 100,
            particle_bound: 2.0,
            particle_speed: 0.05,
            decal_resolution: 2048,
            decal_world_extent: 100.0,
            decal_radius_scale: 4.0,
            decal_opacity_scale: 0.5,
            decal_max_opacity: 0.2,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CameraSettings {
    pub offset: [f32; 3],
    pub lerp_factor: f32,
    pub drag_sensitivity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            offset: [0.0, 5.0, -10.0],
            lerp_factor: 0.1,
            drag_sensitivity: 0.002,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimestepMode {
    PerFrame,
    Accumulated,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ClockSettings {
    pub timestep: f32,
    pub timestep_mode: TimestepMode,
    pub max_steps_per_frame: u32,
    pub frames_per_second: u32,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            timestep_mode: TimestepMode::PerFrame,
            max_steps_per_frame: 4,
            frames_per_second: 60,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct WorldSettings {
    pub spawn_point: [f32; 3],
    pub gravity: f32,
    pub obstacles: Vec<[f32; 3]>,
    pub obstacle_half_extent: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            spawn_point: [0.0, 4.0, 0.0],
            gravity: -20.0,
            obstacles: vec![
                [-20.0, 2.5, -20.0],
                [30.0, 2.5, 40.0],
                [-40.0, 2.5, 30.0],
            ],
            obstacle_half_extent: 2.5,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Settings, DriftError> {
        Self::from_sources(
            Config::builder()
                .add_source(File::with_name("drift.yaml").required(false))
                .add_source(Environment::with_prefix("DRIFT").separator("__")),
        )
    }

    fn from_sources(builder: ConfigBuilder<DefaultState>) -> Result<Settings, DriftError> {
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::load().unwrap_or_else(|err| {
        warn!("failed to read drift.yaml, falling back to defaults: {}", err);
        Settings::default()
    });
}
