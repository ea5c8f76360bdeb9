//! Color model shared between the recorder and renderers.
//!
//! Colors are straight-alpha RGBA and are packed to `0xRRGGBBAA` when written into
//! vertex records. Renderers blend with `SrcAlpha / OneMinusSrcAlpha`.

pub mod color;

pub use color::Color;
