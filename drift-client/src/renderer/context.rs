use std::rc::Rc;

use anyhow::Context as _;
use winit::window::Window;

/*
 * The GpuContext struct contains the data for both the window and the wgpu context.
 * It mostly just makes it easier to initialize everything in one function.
 */
#[allow(dead_code)] // instance is just here to be kept alive
pub struct GpuContext {
    pub(super) window: Rc<Window>,
    pub(super) instance: wgpu::Instance,
    pub(super) surface: wgpu::Surface,
    pub(super) adapter: wgpu::Adapter,
}

impl GpuContext {
    pub fn new(window: Rc<Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::Backends::all());
        let surface = unsafe { instance.create_surface(window.as_ref()) };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            // Request an adapter which can render to our surface
            compatible_surface: Some(&surface),
        }))
        .context("failed to find an appropriate graphics adapter")?;

        Ok(GpuContext {
            window,
            instance,
            surface,
            adapter,
        })
    }
}
