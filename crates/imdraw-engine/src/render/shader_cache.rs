use crate::scene::PrimitiveKind;

use super::{PrimitiveBackend, ShaderRetry};

/// Shader source text per primitive kind, handed over as opaque strings.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    sources: [String; 3],
}

impl ShaderSources {
    pub fn new(
        points: impl Into<String>,
        lines: impl Into<String>,
        triangles: impl Into<String>,
    ) -> Self {
        Self {
            sources: [points.into(), lines.into(), triangles.into()],
        }
    }

    #[inline]
    pub fn get(&self, kind: PrimitiveKind) -> &str {
        &self.sources[kind.index()]
    }

    pub fn set(&mut self, kind: PrimitiveKind, source: impl Into<String>) {
        self.sources[kind.index()] = source.into();
    }
}

/// Lifecycle of one cache entry.
///
/// `Unloaded -> (build) -> Ready | Failed`. Building is synchronous, so the transient
/// compiling state never outlives a call.
#[derive(Debug)]
pub enum ShaderState<P> {
    Unloaded,
    Ready(P),
    Failed(String),
}

impl<P> ShaderState<P> {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, ShaderState::Ready(_))
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, ShaderState::Failed(_))
    }
}

/// Lazily built, per-kind program cache.
#[derive(Debug)]
pub struct ShaderCache<P> {
    entries: [ShaderState<P>; 3],
    retry: ShaderRetry,
}

impl<P> ShaderCache<P> {
    pub fn new(retry: ShaderRetry) -> Self {
        Self {
            entries: [ShaderState::Unloaded, ShaderState::Unloaded, ShaderState::Unloaded],
            retry,
        }
    }

    #[inline]
    pub fn state(&self, kind: PrimitiveKind) -> &ShaderState<P> {
        &self.entries[kind.index()]
    }

    /// Returns the program for `kind`, building it on first use.
    ///
    /// Build failures are logged with the full diagnostic and yield `None`; the caller
    /// skips drawing that kind.
    pub fn get_or_create<B>(
        &mut self,
        kind: PrimitiveKind,
        backend: &mut B,
        sources: &ShaderSources,
    ) -> Option<&P>
    where
        B: PrimitiveBackend<Program = P>,
    {
        let idx = kind.index();

        let build = match &self.entries[idx] {
            ShaderState::Unloaded => true,
            ShaderState::Failed(_) => self.retry == ShaderRetry::EveryFrame,
            ShaderState::Ready(_) => false,
        };

        if build {
            self.entries[idx] = match backend.create_program(kind, sources.get(kind)) {
                Ok(program) => {
                    log::debug!("built {kind} program");
                    ShaderState::Ready(program)
                }
                Err(err) => {
                    log::error!("{err}");
                    if self.retry == ShaderRetry::Never {
                        log::error!("{kind} drawing disabled for this session");
                    }
                    ShaderState::Failed(err.log().to_owned())
                }
            };
        }

        match &self.entries[idx] {
            ShaderState::Ready(program) => Some(program),
            _ => None,
        }
    }

    /// Destroys every built program and returns all entries to `Unloaded`.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: PrimitiveBackend<Program = P>,
    {
        for entry in &mut self.entries {
            if let ShaderState::Ready(program) = std::mem::replace(entry, ShaderState::Unloaded) {
                backend.destroy_program(program);
            }
        }
    }
}
