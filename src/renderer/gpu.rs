//! WebGPU frame surface
//!
//! Clears the canvas to transparent and draws the ball sprite as a single
//! textured quad. The surface is configured with a compositing alpha mode
//! where available so the page shows through around the ball.

use glam::Vec2;

use super::sprite::{Rgba, Sprite};
use super::vertex::{SpriteVertex, sprite_quad};
use super::{Canvas, FrameSurface, RenderError};

/// Sprite uploaded to the GPU
struct SpriteTexture {
    sprite: Sprite,
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// A frame acquired from a [`GpuSurface`]
///
/// Drawing is recorded and encoded at present time. One sprite per frame;
/// a later `draw_sprite` replaces an earlier one.
pub struct GpuFrame {
    output: wgpu::SurfaceTexture,
    clear_color: Rgba,
    sprite: Option<(Sprite, Vec2)>,
}

impl Canvas for GpuFrame {
    fn clear(&mut self, color: Rgba) {
        self.clear_color = color;
        self.sprite = None;
    }

    fn draw_sprite(&mut self, sprite: &Sprite, top_left: Vec2) {
        self.sprite = Some((sprite.clone(), top_left));
    }
}

/// Premultiplied clear color
fn to_wgpu_color(c: Rgba) -> wgpu::Color {
    let a = c.a as f64 / 255.0;
    wgpu::Color {
        r: c.r as f64 / 255.0 * a,
        g: c.g as f64 / 255.0 * a,
        b: c.b as f64 / 255.0 * a,
        a,
    }
}

/// WebGPU-backed surface
pub struct GpuSurface {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vertex_buffer: wgpu::Buffer,
    sprite: Option<SpriteTexture>,
    pub size: (u32, u32),
}

impl GpuSurface {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("accball-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::Unsupported)?;

        // Transparent pixels must let the page through
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| {
                matches!(
                    m,
                    wgpu::CompositeAlphaMode::PreMultiplied | wgpu::CompositeAlphaMode::PostMultiplied
                )
            })
            .or_else(|| surface_caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface config: {}x{}, format: {:?}, alpha: {:?}",
            config.width,
            config.height,
            config.format,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_bind_group_layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_quad"),
            size: std::mem::size_of::<[SpriteVertex; 6]>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            size: (config.width, config.height),
            config,
            pipeline,
            bind_group_layout,
            sampler,
            vertex_buffer,
            sprite: None,
        })
    }

    /// Upload `sprite` unless it is already resident
    fn upload_sprite(&mut self, sprite: &Sprite) {
        if self
            .sprite
            .as_ref()
            .is_some_and(|resident| resident.sprite.same_image(sprite))
        {
            return;
        }

        let size = wgpu::Extent3d {
            width: sprite.width(),
            height: sprite.height(),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sprite_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            sprite.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * sprite.width()),
                rows_per_image: Some(sprite.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::debug!("Uploaded {}x{} sprite texture", sprite.width(), sprite.height());
        self.sprite = Some(SpriteTexture {
            sprite: sprite.clone(),
            _texture: texture,
            bind_group,
        });
    }
}

impl FrameSurface for GpuSurface {
    type Frame = GpuFrame;

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn acquire(&mut self) -> Result<GpuFrame, RenderError> {
        match self.surface.get_current_texture() {
            Ok(output) => Ok(GpuFrame {
                output,
                clear_color: Rgba::TRANSPARENT,
                sprite: None,
            }),
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                // Reconfigure so the next sample gets a fresh frame
                self.surface.configure(&self.device, &self.config);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn present(&mut self, frame: GpuFrame) {
        let GpuFrame {
            output,
            clear_color,
            sprite,
        } = frame;

        let sprite = sprite.filter(|(s, _)| s.width() > 0 && s.height() > 0);
        if let Some((sprite, top_left)) = &sprite {
            self.upload_sprite(sprite);
            let extent = Vec2::new(sprite.width() as f32, sprite.height() as f32);
            let quad = sprite_quad(*top_left, extent, self.size);
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&quad));
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(_), Some(resident)) = (&sprite, &self.sprite) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &resident.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..6, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_is_premultiplied() {
        let c = to_wgpu_color(Rgba::new(255, 0, 0, 51));
        assert!((c.a - 0.2).abs() < 1e-9);
        assert!((c.r - 0.2).abs() < 1e-9);
        assert_eq!(c.g, 0.0);

        let transparent = to_wgpu_color(Rgba::TRANSPARENT);
        assert_eq!(transparent.a, 0.0);
        assert_eq!(transparent.r, 0.0);
    }
}
