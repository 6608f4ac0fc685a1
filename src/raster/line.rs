//! Integer Bresenham line rasterizer with a linear interpolation parameter for
//! depth and color.

use crate::color::{clamp_u8, PackedColor};
use crate::framebuffer::Framebuffer;
use crate::viewport::{trivial_reject, Vertex, Viewport};

/// Each stepped pixel is clamped against `vp` before the depth test, since a
/// line with one endpoint far outside clip-space bounds and one endpoint
/// inside passes `trivial_reject` (only an *all*-vertices-outside primitive
/// is dropped whole) and would otherwise walk pixels well past the viewport.
pub fn rasterize_line(fb: &mut Framebuffer, vp: &Viewport, v0: Vertex, v1: Vertex) {
    if trivial_reject(&[v0, v1]) {
        return;
    }

    let (x0n, y0n, z0n) = (v0.x / v0.w, v0.y / v0.w, v0.z / v0.w);
    let (x1n, y1n, z1n) = (v1.x / v1.w, v1.y / v1.w, v1.z / v1.w);

    let (half_w, half_h) = vp.half_extents();
    let (mid_x, mid_y) = vp.center();

    let mut x0 = (x0n * half_w as f32 + mid_x as f32) as i32;
    let mut y0 = (y0n * -(half_h as f32) + mid_y as f32) as i32;
    let x1 = (x1n * half_w as f32 + mid_x as f32) as i32;
    let y1 = (y1n * -(half_h as f32) + mid_y as f32) as i32;

    let dx = (x1 - x0).abs();
    let sx: i32 = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy: i32 = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let len = ((dx * dx + dy * dy) as f32).sqrt();
    let step = if len > 0.0 { 1.0 / len } else { 0.0 };
    let mut f = 0.0f32;

    loop {
        let in_viewport = x0 >= vp.x0 && x0 <= vp.x1 && y0 >= vp.y0 && y0 <= vp.y1;
        if in_viewport {
            let w0 = f;
            let w1 = 1.0 - f;
            let z = z0n * w0 + z1n * w1;
            let depth_byte = clamp_u8((z * 255.0) as i32);

            if depth_byte < fb.depth_at(x0, y0) {
                let r = clamp_u8(((v0.r as f32 * w0 + v1.r as f32 * w1) / z) as i32);
                let g = clamp_u8(((v0.g as f32 * w0 + v1.g as f32 * w1) / z) as i32);
                let b = clamp_u8(((v0.b as f32 * w0 + v1.b as f32 * w1) / z) as i32);
                fb.set_pixel(x0, y0, PackedColor::from_rgb(r, g, b), depth_byte);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = err * 2;
        if e2 >= dy {
            err += dy;
            x0 += sx;
            f += step;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
            f += step;
        }
    }
}
