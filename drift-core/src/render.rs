use glam::Mat4;

use crate::camera::CameraPose;
use crate::effects::{ParticleEmitter, SkidDecalBuffer};
use crate::pose::Pose;

// Everything the renderer needs to draw one frame, borrowed from the game.
pub struct Frame<'a> {
    pub index: u64,
    pub camera: CameraPose,
    pub projection: Mat4,
    pub chassis: Pose,
    pub wheels: &'a [Pose],
    pub emitters: &'a [ParticleEmitter],
    pub decals: &'a SkidDecalBuffer,
    // set when the decal raster changed since the previous frame
    pub decals_dirty: bool,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);
    fn resize(&mut self, width: u32, height: u32);
    fn dispose(&mut self);
}
