use std::borrow::Cow;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use image::GrayImage;
use tracing::{info, warn};
use winit::window::Window;

use drift_core::effects::marks_to_rgba;
use drift_core::render::{Frame, Renderer};
use drift_core::settings::Settings;
use drift_physics::{CHASSIS_HALF_EXTENTS, WHEEL_RADIUS};

pub mod context;
pub mod mesh;

use context::GpuContext;
use mesh::{BoxInstance, GroundVertex, Mesh, SolidVertex};

const SHADER: &str = include_str!("scene.wgsl");

const SKY: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.81,
    b: 0.92,
    a: 1.0,
};
const CHASSIS_COLOR: [f32; 4] = [0.85, 0.12, 0.10, 1.0];
const WHEEL_COLOR: [f32; 4] = [0.08, 0.08, 0.08, 1.0];
const OBSTACLE_COLOR: [f32; 4] = [0.55, 0.45, 0.35, 1.0];
const SMOKE_COLOR: [f32; 4] = [0.85, 0.85, 0.85, 1.0];
const SMOKE_SIZE: f32 = 0.15;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

/*
 * Draws the scene with wgpu: a textured ground plane carrying the skid marks,
 * and every solid thing (chassis, wheels, obstacles, smoke) as an instanced
 * box. The skid mark texture is only re-uploaded on frames where the raster
 * changed; a CPU copy is kept so it can be written out on dispose.
 */
pub struct SceneRenderer {
    context: GpuContext,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    solid_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    marks_texture: wgpu::Texture,
    marks_bind_group: wgpu::BindGroup,

    cube: Mesh,
    ground: Mesh,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    obstacles: Vec<BoxInstance>,

    marks: GrayImage,
    dump_path: Option<PathBuf>,
    disposed: bool,
}

impl SceneRenderer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(window: Rc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let context = GpuContext::new(window)?;
        let (device, queue) = pollster::block_on(context.adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                features: wgpu::Features::empty(),
                // Make sure we use the texture resolution limits from the adapter, so we can support images the size of the swapchain.
                limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(context.adapter.limits()),
            },
            None,
        ))
        .context("failed to create graphics device")?;

        let size = context.window.inner_size();
        let surface_format = context
            .surface
            .get_preferred_format(&context.adapter)
            .context("surface is incompatible with the adapter")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
        };
        context.surface.configure(&device, &config);
        let depth_view = Self::create_depth_view(&device, &config);

        let shader = device.create_shader_module(&wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER)),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let marks_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marks_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let resolution = settings.effects.decal_resolution;
        let marks_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skid_marks_tex"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        });
        let marks_view = marks_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let marks_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let marks_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marks_bind_group"),
            layout: &marks_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&marks_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&marks_sampler),
                },
            ],
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("solid_layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });
        let ground_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ground_layout"),
            bind_group_layouts: &[&camera_layout, &marks_layout],
            push_constant_ranges: &[],
        });

        let solid_pipeline = Self::create_pipeline(
            &device,
            &shader,
            &solid_layout,
            ("vs_solid", "fs_solid"),
            &[SolidVertex::layout(), BoxInstance::layout()],
            surface_format,
        );
        let ground_pipeline = Self::create_pipeline(
            &device,
            &shader,
            &ground_layout,
            ("vs_ground", "fs_ground"),
            &[GroundVertex::layout()],
            surface_format,
        );

        let (cube_vertices, cube_indices) = mesh::cube();
        let cube = Mesh::new(&device, "cube", &cube_vertices, &cube_indices);
        let (ground_vertices, ground_indices) = mesh::ground(settings.effects.decal_world_extent);
        let ground = Mesh::new(&device, "ground", &ground_vertices, &ground_indices);

        let obstacle_size = Vec3::splat(2.0 * settings.world.obstacle_half_extent);
        let obstacles: Vec<BoxInstance> = settings
            .world
            .obstacles
            .iter()
            .map(|center| {
                BoxInstance::new(
                    Mat4::from_translation(Vec3::from(*center)),
                    obstacle_size,
                    OBSTACLE_COLOR,
                )
            })
            .collect();

        let instance_capacity = 1 + 4 + obstacles.len() + 2 * settings.effects.particle_count;
        let instance_buffer = Self::create_instance_buffer(&device, instance_capacity);

        info!(
            "renderer ready: {}x{} surface, {}px skid mark texture",
            config.width, config.height, resolution
        );
        Ok(SceneRenderer {
            context,
            device,
            queue,
            config,
            depth_view,
            solid_pipeline,
            ground_pipeline,
            camera_buffer,
            camera_bind_group,
            marks_texture,
            marks_bind_group,
            cube,
            ground,
            instance_buffer,
            instance_capacity,
            obstacles,
            marks: GrayImage::new(resolution, resolution),
            dump_path: settings.skidmark_dump_path.as_ref().map(PathBuf::from),
            disposed: false,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        (vertex_entry, fragment_entry): (&str, &str),
        buffers: &[wgpu::VertexBufferLayout],
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(vertex_entry),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: vertex_entry,
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: fragment_entry,
                targets: &[wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Self::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_buffer_tex"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("box_instances"),
            size: (capacity * std::mem::size_of::<BoxInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload_marks(&mut self, frame: &Frame<'_>) {
        let raster = frame.decals.raster();
        if raster.dimensions() != self.marks.dimensions() {
            warn!("skid mark raster changed size, ignoring update");
            return;
        }
        self.marks.copy_from_slice(raster);

        let (width, height) = raster.dimensions();
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.marks_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            raster,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: NonZeroU32::new(width),
                rows_per_image: NonZeroU32::new(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn collect_boxes(&self, frame: &Frame<'_>) -> Vec<BoxInstance> {
        let mut boxes = Vec::with_capacity(self.instance_capacity);

        boxes.push(BoxInstance::new(
            frame.chassis.to_matrix(),
            Vec3::from(CHASSIS_HALF_EXTENTS) * 2.0,
            CHASSIS_COLOR,
        ));
        let wheel_size = Vec3::new(0.4, 2.0 * WHEEL_RADIUS, 2.0 * WHEEL_RADIUS);
        boxes.extend(
            frame
                .wheels
                .iter()
                .map(|wheel| BoxInstance::new(wheel.to_matrix(), wheel_size, WHEEL_COLOR)),
        );
        boxes.extend_from_slice(&self.obstacles);

        for emitter in frame.emitters.iter().filter(|emitter| emitter.is_visible()) {
            boxes.extend(emitter.world_positions().map(|position| {
                BoxInstance::new(
                    Mat4::from_translation(position),
                    Vec3::splat(SMOKE_SIZE),
                    SMOKE_COLOR,
                )
            }));
        }

        boxes
    }

    fn dump_marks(&self) {
        let path = match &self.dump_path {
            Some(path) => path,
            None => return,
        };

        match marks_to_rgba(&self.marks).save(path) {
            Ok(()) => info!("skid marks written to {}", path.display()),
            Err(err) => warn!("could not write skid marks to {}: {}", path.display(), err),
        }
    }
}

impl Renderer for SceneRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        if self.disposed {
            return;
        }

        if frame.decals_dirty {
            self.upload_marks(frame);
        }

        let uniform = CameraUniform {
            view_proj: (frame.projection * frame.camera.view_matrix()).to_cols_array_2d(),
            light_dir: Vec3::new(-0.4, -1.0, -0.3).normalize().extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let boxes = self.collect_boxes(frame);
        if boxes.len() > self.instance_capacity {
            self.instance_capacity = boxes.len().next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&boxes));

        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.context.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                warn!("dropping frame {}: {}", frame.index, err);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY),
                        store: true,
                    },
                }],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            pass.set_pipeline(&self.ground_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(1, &self.marks_bind_group, &[]);
            pass.set_vertex_buffer(0, self.ground.vertex_buffer.slice(..));
            pass.set_index_buffer(self.ground.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.ground.num_elements, 0, 0..1);

            pass.set_pipeline(&self.solid_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.cube.num_elements, 0, 0..boxes.len() as u32);
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.context.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.dump_marks();
        info!("renderer disposed");
    }
}
