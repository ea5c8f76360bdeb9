/// What the shader cache does after a program failed to build.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ShaderRetry {
    /// Failure is terminal for the session; drawing of that kind stays disabled.
    #[default]
    Never,
    /// Rebuild is attempted again on the next use (every frame until it succeeds).
    EveryFrame,
}

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Upper bound on the upload capacity. The backend limit wins when it is lower.
    pub max_upload_bytes: usize,

    /// Initialization fails when the effective capacity is below this value.
    ///
    /// 16 KiB is the smallest uniform block size GL 3.1 / D3D11 class hardware guarantees.
    pub min_upload_bytes: usize,

    pub shader_retry: ShaderRetry,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024;
pub const DEFAULT_MIN_UPLOAD_BYTES: usize = 16 * 1024;

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            min_upload_bytes: DEFAULT_MIN_UPLOAD_BYTES,
            shader_retry: ShaderRetry::Never,
        }
    }
}
