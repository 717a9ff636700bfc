use crate::constants::{AMBIENT_LIGHT, CLEAR_COLOR, DEPTH_FORMAT};
use crate::core::{FrameRenderer, ModelAsset, Scene};
use fnv::FnvHashMap;
use web_sys as web;

mod helpers;
mod mesh;
mod targets;

use mesh::{GlobalUniforms, LightPacked, ModelResources};
use targets::DepthTarget;

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    depth: DepthTarget,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // Bind group used by primitives without a base colour texture
    white_material: wgpu::BindGroup,
    // Texture handles backing the material bind groups
    textures: Vec<wgpu::Texture>,
    // Keyed by glTF material index
    material_groups: FnvHashMap<usize, wgpu::BindGroup>,
    model: Option<ModelResources>,

    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // the page shows through wherever the clear colour survives
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_entry = |visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bgl"),
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

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::core::MODEL_WGSL.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model_pl"),
            bind_group_layouts: &[&globals_layout, &draw_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let pipeline =
            helpers::make_model_pipeline(&device, &pipeline_layout, &shader, format, DEPTH_FORMAT);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let (white_tex, white_view) =
            helpers::upload_rgba_texture(&device, &queue, "white_tex", 1, 1, &[255; 4]);
        let white_material =
            material_bind_group(&device, &material_layout, &white_view, &sampler, "white_bg");

        let depth = DepthTarget::new(&device, width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            depth,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            material_layout,
            sampler,
            white_material,
            textures: vec![white_tex],
            material_groups: FnvHashMap::default(),
            model: None,
            width,
            height,
        })
    }

    /// Upload geometry and textures for the attached model.
    pub fn upload_model(&mut self, asset: &ModelAsset) {
        self.material_groups.clear();
        self.textures.truncate(1);
        for (index, material) in asset.materials.iter().enumerate() {
            let Some(tex) = material
                .base_color_texture
                .and_then(|t| asset.textures.get(t))
                .and_then(Option::as_ref)
            else {
                continue;
            };
            let (texture, view) = helpers::upload_rgba_texture(
                &self.device,
                &self.queue,
                "base_color_tex",
                tex.width,
                tex.height,
                &tex.rgba,
            );
            let group = material_bind_group(
                &self.device,
                &self.material_layout,
                &view,
                &self.sampler,
                "material_bg",
            );
            self.material_groups.insert(index, group);
            self.textures.push(texture);
        }
        self.model = Some(mesh::upload_model(&self.device, &self.draw_layout, asset));
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth.recreate(&self.device, width, height);
        }
    }

    fn write_globals(&self, scene: &Scene) {
        let lights = scene.lights.lights.map(|l| {
            let d = l.direction();
            LightPacked {
                direction: [d.x, d.y, d.z, 0.0],
                color: [l.color.x, l.color.y, l.color.z, l.intensity],
            }
        });
        let globals = GlobalUniforms {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            lights,
            ambient: [AMBIENT_LIGHT[0], AMBIENT_LIGHT[1], AMBIENT_LIGHT[2], 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        self.write_globals(scene);
        if let (Some(model), Some(res)) = (scene.model(), &self.model) {
            for item in &res.items {
                let uniforms = mesh::pack_draw(model, item);
                self.queue
                    .write_buffer(&item.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("model_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(res) = &self.model {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.globals_bind_group, &[]);
                for item in &res.items {
                    let prim = &res.meshes[item.mesh][item.primitive];
                    if prim.index_count == 0 {
                        continue;
                    }
                    let material = prim
                        .material
                        .and_then(|m| self.material_groups.get(&m))
                        .unwrap_or(&self.white_material);
                    rpass.set_bind_group(1, &item.bind_group, &[]);
                    rpass.set_bind_group(2, material, &[]);
                    rpass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                    rpass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..prim.index_count, 0, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl FrameRenderer for GpuState<'_> {
    fn render(&mut self, scene: &Scene) -> anyhow::Result<()> {
        match self.draw(scene) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[render] surface lost; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("render error: {:?}", e)),
        }
    }
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
