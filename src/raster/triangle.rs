//! Edge-function triangle rasterizer: perspective divide, 4-bit subpixel snap,
//! back-face culling, and a scanline fill with perspective-correct color and
//! linear depth.

use crate::color::{clamp_u8, PackedColor};
use crate::framebuffer::Framebuffer;
use crate::raster::{SUBPIXEL_BITS, SUBPIXEL_STEP};
use crate::viewport::{trivial_reject, Vertex, Viewport};

pub fn rasterize_triangle(fb: &mut Framebuffer, vp: &Viewport, v0: Vertex, v1: Vertex, v2: Vertex) {
    if trivial_reject(&[v0, v1, v2]) {
        return;
    }

    let (x0n, y0n, z0n) = (v0.x / v0.w, v0.y / v0.w, v0.z / v0.w);
    let (x1n, y1n, z1n) = (v1.x / v1.w, v1.y / v1.w, v1.z / v1.w);
    let (x2n, y2n, z2n) = (v2.x / v2.w, v2.y / v2.w, v2.z / v2.w);

    let (half_w, half_h) = vp.half_extents();
    let (mid_x, mid_y) = vp.center();

    let snap = |xn: f32, yn: f32| -> (i32, i32) {
        let xs = xn * half_w as f32;
        let ys = yn * -(half_h as f32);
        (
            (xs * SUBPIXEL_STEP - 0.5).floor() as i32,
            (ys * SUBPIXEL_STEP - 0.5).floor() as i32,
        )
    };

    let (sx0, sy0) = snap(x0n, y0n);
    let (sx1, sy1) = snap(x1n, y1n);
    let (sx2, sy2) = snap(x2n, y2n);

    let a0 = sy1 - sy2;
    let b0 = sx2 - sx1;
    let c0 = ((sx1 as i64 * sy2 as i64 - sy1 as i64 * sx2 as i64) >> SUBPIXEL_BITS) as i32;

    let a1 = sy2 - sy0;
    let b1 = sx0 - sx2;
    let c1 = ((sx2 as i64 * sy0 as i64 - sy2 as i64 * sx0 as i64) >> SUBPIXEL_BITS) as i32;

    let a2 = sy0 - sy1;
    let b2 = sx1 - sx0;
    let c2 = ((sx0 as i64 * sy1 as i64 - sy0 as i64 * sx1 as i64) >> SUBPIXEL_BITS) as i32;

    let area = c0 + c1 + c2;
    if area <= 0 {
        return;
    }

    let min_x = (sx0.min(sx1).min(sx2) >> SUBPIXEL_BITS).max(-half_w);
    let max_x = (sx0.max(sx1).max(sx2) >> SUBPIXEL_BITS).min(half_w - 1);
    let min_y = (sy0.min(sy1).min(sy2) >> SUBPIXEL_BITS).max(-half_h);
    let max_y = (sy0.max(sy1).max(sy2) >> SUBPIXEL_BITS).min(half_h - 1);

    let mut w0_row = a0 * min_x + b0 * min_y + c0;
    let mut w1_row = a1 * min_x + b1 * min_y + c1;
    let mut w2_row = a2 * min_x + b2 * min_y + c2;

    for i in min_y..=max_y {
        let mut w0 = w0_row;
        let mut w1 = w1_row;
        let mut w2 = w2_row;

        for j in min_x..=max_x {
            if (w0 | w1 | w2) >= 0 {
                let z_sum = z0n * w0 as f32 + z1n * w1 as f32 + z2n * w2 as f32;
                let depth_val = ((z_sum / area as f32) * 255.0) as i32;
                let depth_byte = clamp_u8(depth_val);

                let x = mid_x + j;
                let y = mid_y + i;

                if depth_byte < fb.depth_at(x, y) {
                    let r = clamp_u8(
                        ((v0.r as f32 * w0 as f32 + v1.r as f32 * w1 as f32 + v2.r as f32 * w2 as f32)
                            / z_sum) as i32,
                    );
                    let g = clamp_u8(
                        ((v0.g as f32 * w0 as f32 + v1.g as f32 * w1 as f32 + v2.g as f32 * w2 as f32)
                            / z_sum) as i32,
                    );
                    let b = clamp_u8(
                        ((v0.b as f32 * w0 as f32 + v1.b as f32 * w1 as f32 + v2.b as f32 * w2 as f32)
                            / z_sum) as i32,
                    );
                    fb.set_pixel(x, y, PackedColor::from_rgb(r, g, b), depth_byte);
                }
            }

            w0 += a0;
            w1 += a1;
            w2 += a2;
        }

        w0_row += b0;
        w1_row += b1;
        w2_row += b2;
    }
}
