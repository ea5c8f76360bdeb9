//! Built-in primitive shaders and their offline validation.
//!
//! Sources reference a `MAX_VERTEX_DATA` constant they do not declare; `specialize`
//! prepends it once the upload capacity is known.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::render::{ShaderError, ShaderSources};
use crate::scene::PrimitiveKind;

pub const POINTS_WGSL: &str = include_str!("shaders/points.wgsl");
pub const LINES_WGSL: &str = include_str!("shaders/lines.wgsl");
pub const TRIANGLES_WGSL: &str = include_str!("shaders/triangles.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub fn builtin_sources() -> ShaderSources {
    ShaderSources::new(POINTS_WGSL, LINES_WGSL, TRIANGLES_WGSL)
}

/// Declares the vertex-data array length for a buffer of `records` records.
pub fn specialize(source: &str, records: usize) -> String {
    format!("const MAX_VERTEX_DATA: u32 = {records}u;\n\n{source}")
}

/// Parses and validates a specialized source.
///
/// Parse and validation failures map to `Compile`; a missing entry point maps to `Link`.
pub fn validate(kind: PrimitiveKind, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::Compile {
        kind,
        log: err.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|err| ShaderError::Compile {
            kind,
            log: err.emit_to_string(source),
        })?;

    for (name, stage) in [
        (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage);
        if !found {
            return Err(ShaderError::Link {
                kind,
                log: format!("missing {stage:?} entry point `{name}`"),
            });
        }
    }

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: usize = 64 * 1024 / 32;

    #[test]
    fn builtin_shaders_validate() {
        let sources = builtin_sources();
        for kind in PrimitiveKind::ALL {
            let source = specialize(sources.get(kind), RECORDS);
            if let Err(err) = validate(kind, &source) {
                panic!("{err}");
            }
        }
    }

    #[test]
    fn unspecialized_source_fails_to_compile() {
        let err = validate(PrimitiveKind::Points, POINTS_WGSL).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
        assert!(err.log().contains("MAX_VERTEX_DATA"), "{}", err.log());
    }

    #[test]
    fn syntax_error_is_reported_with_diagnostic() {
        let err = validate(PrimitiveKind::Lines, "fn vs_main( {").unwrap_err();
        assert_eq!(err.kind(), PrimitiveKind::Lines);
        assert!(matches!(err, ShaderError::Compile { .. }));
        assert!(!err.log().is_empty());
    }

    #[test]
    fn missing_fragment_entry_is_a_link_error() {
        let source = specialize(&TRIANGLES_WGSL.replace("fn fs_main", "fn fs_other"), RECORDS);
        let err = validate(PrimitiveKind::Triangles, &source).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.log().contains(FRAGMENT_ENTRY));
    }

    #[test]
    fn specialize_declares_record_count() {
        let source = specialize("// body", 2048);
        assert!(source.starts_with("const MAX_VERTEX_DATA: u32 = 2048u;"));
        assert!(source.ends_with("// body"));
    }
}
