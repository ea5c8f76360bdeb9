use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{
    FrameUniforms, PrimitiveBackend, RenderResult, RenderTarget, ShaderError,
};
use crate::scene::{PrimitiveKind, Topology, VERTEX_RECORD_SIZE};

use super::shaders::{self, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Base geometry corner (xy in [-1, 1], zw unused).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Corner {
    xyzw: [f32; 4],
}

/// Strip order: bottom-left, bottom-right, top-left, top-right.
/// The first three also form the base triangle.
const QUAD_CORNERS: [Corner; 4] = [
    Corner { xyzw: [-1.0, -1.0, 0.0, 0.0] },
    Corner { xyzw: [1.0, -1.0, 0.0, 0.0] },
    Corner { xyzw: [-1.0, 1.0, 0.0, 0.0] },
    Corner { xyzw: [1.0, 1.0, 0.0, 0.0] },
];

impl Corner {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Corner>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

/// Frames that draw between two trims of the upload slot pool.
const SLOT_TRIM_INTERVAL: u32 = 240;

/// Render pipeline for one primitive kind.
#[derive(Debug)]
pub struct WgpuProgram {
    kind: PrimitiveKind,
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
}

impl WgpuProgram {
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Color target format the pipeline was built for.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Capacity-sized uniform buffer plus its group-0 bind group.
struct UploadSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Objects that live between `initialize` and `shutdown`.
struct Resources {
    capacity: usize,
    vertex_data_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    quad_vbo: wgpu::Buffer,
    frame_ubo: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    slots: Vec<UploadSlot>,
}

enum PassCmd {
    SetProgram(Arc<WgpuProgram>),
    Draw {
        slot: usize,
        base_vertex_count: u32,
        instance_count: u32,
    },
}

/// wgpu implementation of [`PrimitiveBackend`].
///
/// `queue.write_buffer` calls are ordered before the frame's command buffer, so a single
/// upload buffer rewritten per batch would leave every draw reading the last batch. Each
/// batch therefore takes its own slot from a pool that grows to the largest frame seen.
/// Every `SLOT_TRIM_INTERVAL` drawing frames the pool shrinks back to the most slots any
/// of those frames used, so a one-off burst does not pin its buffers until shutdown.
/// Draws are recorded as pass commands and replayed by [`encode`](Self::encode).
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    limit: usize,

    resources: Option<Resources>,
    commands: Vec<PassCmd>,
    next_slot: usize,
    current_slot: Option<usize>,
    bound_topology: Option<Topology>,
    trim_frames: u32,
    trim_peak: usize,
}

impl WgpuBackend {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let limit = device.limits().max_uniform_buffer_binding_size as usize;
        Self {
            device: device.clone(),
            queue: queue.clone(),
            surface_format,
            limit,
            resources: None,
            commands: Vec::new(),
            next_slot: 0,
            current_slot: None,
            bound_topology: None,
            trim_frames: 0,
            trim_peak: 0,
        }
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Programs built afterwards target `format`. Existing programs must be invalidated.
    pub fn set_surface_format(&mut self, format: wgpu::TextureFormat) {
        self.surface_format = format;
    }

    /// Upload slots allocated so far.
    pub fn slot_count(&self) -> usize {
        self.resources.as_ref().map_or(0, |r| r.slots.len())
    }

    /// Replays the recorded draws into one render pass over `target` and clears them.
    ///
    /// Does nothing when no draw was recorded.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>) {
        if self.commands.is_empty() {
            return;
        }
        let Some(res) = self.resources.as_ref() else {
            self.commands.clear();
            return;
        };

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("imdraw primitive pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_vertex_buffer(0, res.quad_vbo.slice(..));
            rpass.set_bind_group(1, &res.frame_bind_group, &[]);

            for cmd in &self.commands {
                match cmd {
                    PassCmd::SetProgram(program) => rpass.set_pipeline(&program.pipeline),
                    PassCmd::Draw {
                        slot,
                        base_vertex_count,
                        instance_count,
                    } => {
                        rpass.set_bind_group(0, &res.slots[*slot].bind_group, &[]);
                        rpass.draw(0..*base_vertex_count, 0..*instance_count);
                    }
                }
            }
        }

        self.commands.clear();
    }

    fn create_resources(&self, capacity: usize) -> Resources {
        let vertex_data_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("imdraw vertex data bgl"),
                    entries: &[uniform_entry(capacity as u64)],
                });

        let frame_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("imdraw frame bgl"),
                entries: &[uniform_entry(std::mem::size_of::<FrameUniforms>() as u64)],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("imdraw primitive pipeline layout"),
                bind_group_layouts: &[&vertex_data_layout, &frame_layout],
                immediate_size: 0,
            });

        let quad_vbo = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("imdraw quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_CORNERS),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let frame_ubo = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("imdraw frame ubo"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("imdraw frame bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.as_entire_binding(),
            }],
        });

        Resources {
            capacity,
            vertex_data_layout,
            pipeline_layout,
            quad_vbo,
            frame_ubo,
            frame_bind_group,
            slots: Vec::new(),
        }
    }

    /// Drops slots beyond the peak usage of the last `SLOT_TRIM_INTERVAL` frames.
    ///
    /// Runs before the new frame takes any slot; `next_slot` still counts the previous
    /// frame's uploads.
    fn trim_slots(&mut self) {
        let Some(res) = self.resources.as_mut() else { return };

        self.trim_peak = self.trim_peak.max(self.next_slot);
        self.trim_frames += 1;
        if self.trim_frames < SLOT_TRIM_INTERVAL {
            return;
        }

        if self.trim_peak < res.slots.len() {
            log::debug!(
                "upload slot pool trimmed from {} to {}",
                res.slots.len(),
                self.trim_peak
            );
            res.slots.truncate(self.trim_peak);
        }
        self.trim_frames = 0;
        self.trim_peak = 0;
    }

    /// Builds the pipeline inside a validation error scope.
    ///
    /// naga only checks the module on its own; mismatches against the pipeline layout or
    /// vertex buffers surface here and are reported as link errors.
    fn build_pipeline(
        &self,
        res: &Resources,
        kind: PrimitiveKind,
        source: String,
    ) -> Result<wgpu::RenderPipeline, ShaderError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let label = format!("imdraw {kind}");
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let topology = match kind.topology() {
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        };

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label.as_str()),
            layout: Some(&res.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Corner::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        match pollster::block_on(scope.pop()) {
            None => Ok(pipeline),
            Some(err) => Err(ShaderError::Link {
                kind,
                log: err.to_string(),
            }),
        }
    }
}

fn uniform_entry(size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

impl PrimitiveBackend for WgpuBackend {
    type Program = Arc<WgpuProgram>;

    fn max_upload_bytes(&self) -> usize {
        self.limit
    }

    fn initialize(&mut self, capacity: usize) -> RenderResult<()> {
        self.resources = Some(self.create_resources(capacity));
        log::debug!("wgpu primitive backend ready ({capacity} byte upload slots)");
        Ok(())
    }

    fn create_program(
        &mut self,
        kind: PrimitiveKind,
        source: &str,
    ) -> Result<Self::Program, ShaderError> {
        let Some(res) = self.resources.as_ref() else {
            return Err(ShaderError::Link {
                kind,
                log: "backend is not initialized".to_owned(),
            });
        };

        let source = shaders::specialize(source, res.capacity / VERTEX_RECORD_SIZE);
        shaders::validate(kind, &source)?;

        let pipeline = self.build_pipeline(res, kind, source)?;
        Ok(Arc::new(WgpuProgram {
            kind,
            format: self.surface_format,
            pipeline,
        }))
    }

    fn destroy_program(&mut self, program: Self::Program) {
        // Pipelines still referenced by recorded commands are released after `encode`.
        drop(program);
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.trim_slots();
        self.commands.clear();
        self.next_slot = 0;
        self.current_slot = None;
        self.bound_topology = None;

        if let Some(res) = self.resources.as_ref() {
            self.queue
                .write_buffer(&res.frame_ubo, 0, bytemuck::bytes_of(frame));
        }
    }

    fn bind_program(&mut self, kind: PrimitiveKind, program: &Self::Program) {
        debug_assert_eq!(kind, program.kind);
        self.bound_topology = Some(kind.topology());
        self.commands.push(PassCmd::SetProgram(Arc::clone(program)));
    }

    fn upload(&mut self, bytes: &[u8]) {
        let Some(res) = self.resources.as_mut() else { return };
        debug_assert!(bytes.len() <= res.capacity);

        let slot = self.next_slot;
        if slot == res.slots.len() {
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("imdraw upload slot"),
                size: res.capacity as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("imdraw upload slot bind group"),
                layout: &res.vertex_data_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            res.slots.push(UploadSlot { buffer, bind_group });
            log::trace!("upload slot pool grew to {}", res.slots.len());
        }

        self.queue.write_buffer(&res.slots[slot].buffer, 0, bytes);
        self.next_slot += 1;
        self.current_slot = Some(slot);
    }

    fn draw_instanced(&mut self, topology: Topology, base_vertex_count: u32, instance_count: u32) {
        debug_assert_eq!(self.bound_topology, Some(topology));
        let Some(slot) = self.current_slot.take() else {
            log::warn!("draw without a preceding upload ignored");
            return;
        };
        self.commands.push(PassCmd::Draw {
            slot,
            base_vertex_count,
            instance_count,
        });
    }

    fn shutdown(&mut self) {
        self.commands.clear();
        self.resources = None;
        self.next_slot = 0;
        self.current_slot = None;
        self.trim_frames = 0;
        self.trim_peak = 0;
        log::debug!("wgpu primitive backend released");
    }
}
