//! The two rasterizers: filled triangles and lines, sharing the same perspective
//! divide and viewport mapping conventions.

pub mod line;
pub mod triangle;

const SUBPIXEL_BITS: i32 = 4;
const SUBPIXEL_STEP: f32 = 16.0;
