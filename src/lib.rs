//! rasterm - a header-only-style software 3D rasterizer and half-block
//! truecolor renderer for ANSI terminals.
//!
//! Turns any truecolor-capable TTY into a raster display: an edge-function
//! triangle rasterizer with perspective-correct interpolation and a depth
//! buffer, a Bresenham line rasterizer, a printf-style text writer with
//! inline palette-color escapes, and a dirty-region-driven paint pass that
//! packs two logical pixels into each terminal cell via the upper-half-block
//! glyph (U+2580).

pub mod canvas;
pub mod color;
pub mod framebuffer;
pub mod host;
pub mod paint;
pub mod raster;
pub mod text;
pub mod viewport;

pub use canvas::Canvas;
pub use color::PackedColor;
pub use viewport::{Vertex, Viewport};
