//! Test-only backend that records every GPU-visible operation.

use std::collections::HashSet;

use crate::scene::{PrimitiveKind, Topology};

use super::{FrameUniforms, PrimitiveBackend, RenderResult, ShaderError, ShaderSources};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    BeginFrame(FrameUniforms),
    Bind { kind: PrimitiveKind, program: u32 },
    Upload(Vec<u8>),
    Draw { topology: Topology, base_vertex_count: u32, instance_count: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub limit: usize,
    pub capacity: Option<usize>,
    pub ops: Vec<Op>,
    pub compilations: usize,
    pub failing: HashSet<PrimitiveKind>,
    pub destroyed: Vec<u32>,
    pub shutdowns: usize,
    next_program: u32,
}

impl RecordingBackend {
    pub fn new(limit: usize) -> Self {
        Self { limit, ..Default::default() }
    }

    pub fn fail_kind(&mut self, kind: PrimitiveKind) {
        self.failing.insert(kind);
    }

    pub fn uploads(&self) -> impl Iterator<Item = &[u8]> {
        self.ops.iter().filter_map(|op| match op {
            Op::Upload(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    pub fn draws(&self) -> Vec<(Topology, u32, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Draw { topology, base_vertex_count, instance_count } => {
                    Some((*topology, *base_vertex_count, *instance_count))
                }
                _ => None,
            })
            .collect()
    }
}

impl PrimitiveBackend for RecordingBackend {
    type Program = u32;

    fn max_upload_bytes(&self) -> usize {
        self.limit
    }

    fn initialize(&mut self, capacity: usize) -> RenderResult<()> {
        assert!(self.capacity.is_none(), "initialized twice");
        self.capacity = Some(capacity);
        Ok(())
    }

    fn create_program(&mut self, kind: PrimitiveKind, _source: &str) -> Result<u32, ShaderError> {
        self.compilations += 1;
        if self.failing.contains(&kind) {
            return Err(ShaderError::Compile {
                kind,
                log: format!("0:1(1): error: {kind} shader rejected"),
            });
        }
        self.next_program += 1;
        Ok(self.next_program)
    }

    fn destroy_program(&mut self, program: u32) {
        self.destroyed.push(program);
    }

    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.ops.push(Op::BeginFrame(*frame));
    }

    fn bind_program(&mut self, kind: PrimitiveKind, program: &u32) {
        self.ops.push(Op::Bind { kind, program: *program });
    }

    fn upload(&mut self, bytes: &[u8]) {
        let capacity = self.capacity.unwrap_or(0);
        assert!(bytes.len() <= capacity, "upload of {} bytes exceeds {capacity}", bytes.len());
        self.ops.push(Op::Upload(bytes.to_vec()));
    }

    fn draw_instanced(&mut self, topology: Topology, base_vertex_count: u32, instance_count: u32) {
        self.ops.push(Op::Draw { topology, base_vertex_count, instance_count });
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
        self.capacity = None;
    }
}

pub fn test_sources() -> ShaderSources {
    ShaderSources::new("points", "lines", "triangles")
}

/// Device on any available adapter (software ones included), or `None` on machines
/// without one. Tests that need real GPU objects return early in that case.
pub fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("imdraw test device"),
                required_limits: adapter.limits(),
                ..Default::default()
            })
            .await
            .ok()
    })
}
