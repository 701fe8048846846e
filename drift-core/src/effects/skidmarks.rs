use glam::Vec3;
use image::{GrayImage, Luma, Rgba, RgbaImage};

/*
 * Skid marks painted onto the ground plane. Each pixel stores how much of
 * the ground is covered by rubber (0 = clean, 255 = solid black); marks only
 * ever add coverage, so the buffer never fades on its own.
 *
 * World x runs left to right across the raster and world z runs bottom to
 * top, both spanning [-extent, extent].
 */
pub struct SkidDecalBuffer {
    raster: GrayImage,
    world_extent: f32,
    dirty: bool,
}

impl SkidDecalBuffer {
    pub fn new(resolution: u32, world_extent: f32) -> Self {
        Self {
            raster: GrayImage::new(resolution, resolution),
            world_extent,
            dirty: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    pub fn world_to_pixel(&self, world: Vec3) -> (f32, f32) {
        let span = 2.0 * self.world_extent;
        (
            (world.x / span + 0.5) * self.width() as f32,
            (-world.z / span + 0.5) * self.height() as f32,
        )
    }

    // Coverage of one pixel in [0, 1].
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        self.raster.get_pixel(x, y)[0] as f32 / 255.0
    }

    pub fn is_blank(&self) -> bool {
        self.raster.iter().all(|&value| value == 0)
    }

    // Fills a disc centred under `world` using source-over blending: existing
    // rubber shows through, so overlapping marks get darker up to solid.
    pub fn paint(&mut self, world: Vec3, radius: f32, opacity: f32) {
        if radius <= 0.0 || opacity <= 0.0 {
            return;
        }

        let (cx, cy) = self.world_to_pixel(world);
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width());
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height());

        let alpha = opacity.min(1.0);
        let radius_sq = radius * radius;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }

                let pixel = self.raster.get_pixel_mut(x, y);
                let existing = pixel[0] as f32 / 255.0;
                let blended = alpha + existing * (1.0 - alpha);
                *pixel = Luma([(blended * 255.0).round().min(255.0) as u8]);
                self.dirty = true;
            }
        }
    }

    pub fn clear(&mut self) {
        self.raster.fill(0);
        self.dirty = true;
    }

    // True if anything changed since the last call; the renderer uses it to
    // decide whether to re-upload the texture.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn to_rgba(&self) -> RgbaImage {
        marks_to_rgba(&self.raster)
    }
}

// Black marks on a transparent background, ready to blend over the ground.
pub fn marks_to_rgba(raster: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
        Rgba([0, 0, 0, raster.get_pixel(x, y)[0]])
    })
}
