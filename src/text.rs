//! Raw pixel blitting and the inline-color-escape text writer.

use crate::color::{index_to_rgb, PackedColor};
use crate::framebuffer::Framebuffer;
use crate::viewport::Viewport;

/// The text writer's current foreground/background colors, carried across
/// `print` calls the same way a terminal carries its SGR state.
#[derive(Debug, Clone, Copy)]
pub struct TextState {
    pub fg: PackedColor,
    pub bg: PackedColor,
}

impl Default for TextState {
    fn default() -> Self {
        TextState {
            fg: PackedColor::from_rgb(0xff, 0xff, 0xff),
            bg: PackedColor::BLACK,
        }
    }
}

/// Copy `data` (row-major, `w` x `h`) into the framebuffer at viewport-relative
/// `(x, y)`, clipping against the viewport on every side.
pub fn blit(fb: &mut Framebuffer, vp: &Viewport, x: i32, y: i32, w: i32, h: i32, data: &[PackedColor]) {
    for row in 0..h {
        let yy = vp.y0 + y + row;
        if yy < vp.y0 || yy > vp.y1 {
            continue;
        }
        for col in 0..w {
            let xx = vp.x0 + x + col;
            if xx < vp.x0 || xx > vp.x1 {
                continue;
            }
            let idx = (row * w + col) as usize;
            if let Some(&color) = data.get(idx) {
                fb.set_color(xx, yy, color);
            }
        }
    }
}

enum ParseState {
    Normal,
    Esc,
    Cmd,
    Arg,
}

/// Write `text` at viewport-relative `(x, y)`, interpreting `ESC[<cmd><n>(;<n>)*]`
/// runs as palette-index color changes (`cmd == 'f'` sets foreground, anything
/// else sets background) rather than printable characters. Returns the number of
/// viewport columns advanced.
pub fn print(fb: &mut Framebuffer, vp: &Viewport, state: &mut TextState, x: i32, y: i32, text: &str) -> i32 {
    let mut x = vp.x0 + x;
    let y = vp.y0 + y;

    let mut parse = ParseState::Normal;
    let mut cmd = b'b';
    let mut arg: u32 = 0;

    for &byte in text.as_bytes() {
        if y < vp.y0 || y > vp.y1 || x > vp.x1 {
            break;
        }

        match parse {
            ParseState::Normal => {
                if byte == 0x1b {
                    parse = ParseState::Esc;
                } else {
                    if x >= vp.x0 {
                        fb.set_char(x, y, state.fg, state.bg, byte);
                    }
                    x += 1;
                }
            }
            ParseState::Esc => {
                parse = if byte == b'[' { ParseState::Cmd } else { ParseState::Normal };
            }
            ParseState::Cmd => {
                cmd = byte;
                arg = 0;
                parse = ParseState::Arg;
            }
            ParseState::Arg => {
                if byte.is_ascii_digit() {
                    arg = arg * 10 + (byte - b'0') as u32;
                } else {
                    let (r, g, b) = index_to_rgb(arg.min(255) as u8);
                    let color = PackedColor::from_rgb(r, g, b);
                    if cmd == b'f' {
                        state.fg = color;
                    } else {
                        state.bg = color;
                    }
                    parse = if byte == b';' { ParseState::Cmd } else { ParseState::Normal };
                }
            }
        }
    }

    x - vp.x0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(cols: i32, rows: i32) -> Viewport {
        Viewport::new(0, 0, cols, rows, cols, rows)
    }

    fn pixel_color(fb: &Framebuffer, x: i32, y: i32) -> PackedColor {
        let cell_row = (y / 2) as usize;
        if y % 2 == 0 {
            fb.fg_at(cell_row, x as usize)
        } else {
            fb.bg_at(cell_row, x as usize)
        }
    }

    #[test]
    fn blit_copies_pixels_clipped_to_the_viewport() {
        let mut fb = Framebuffer::new(10, 5);
        let viewport = vp(10, 10);
        let red = PackedColor::from_rgb(255, 0, 0);
        let data = vec![red; 4];
        blit(&mut fb, &viewport, 0, 0, 2, 2, &data);
        assert_eq!(fb.fg_at(0, 0), red);
        assert_eq!(fb.fg_at(0, 1), red);
    }

    #[test]
    fn blit_drops_pixels_outside_the_viewport() {
        let mut fb = Framebuffer::new(10, 5);
        let viewport = vp(10, 10);
        let red = PackedColor::from_rgb(255, 0, 0);
        let data = vec![red; 4];
        blit(&mut fb, &viewport, -1, 0, 2, 2, &data);
        // x=-1 column is clipped; only x=0 column should be written
        assert_eq!(fb.fg_at(0, 0), red);
    }

    #[test]
    fn blit_does_not_escape_a_viewport_smaller_than_the_framebuffer() {
        // The framebuffer is 10x10 pixels; the viewport only covers a 4x4
        // block in the middle of it. A blit aimed well past the viewport on
        // every side must not paint anything outside that block.
        let mut fb = Framebuffer::new(10, 5);
        let restricted = Viewport::new(2, 2, 4, 4, fb.cols() as i32, fb.pixel_rows() as i32);
        let red = PackedColor::from_rgb(255, 0, 0);
        let data = vec![red; 400];
        blit(&mut fb, &restricted, -5, -5, 20, 20, &data);

        for y in 0..fb.pixel_rows() as i32 {
            for x in 0..fb.cols() as i32 {
                let inside = x >= restricted.x0 && x <= restricted.x1 && y >= restricted.y0 && y <= restricted.y1;
                if !inside {
                    assert_eq!(
                        pixel_color(&fb, x, y),
                        PackedColor::BLACK,
                        "pixel ({x},{y}) outside the viewport was painted"
                    );
                }
            }
        }
        assert_eq!(pixel_color(&fb, restricted.x0, restricted.y0), red);
    }

    #[test]
    fn print_stops_at_a_viewport_narrower_than_the_framebuffer() {
        let mut fb = Framebuffer::new(10, 5);
        let restricted = Viewport::new(0, 0, 4, fb.pixel_rows() as i32, fb.cols() as i32, fb.pixel_rows() as i32);
        let mut state = TextState::default();
        let advanced = print(&mut fb, &restricted, &mut state, 0, 0, "0123456789");
        assert_eq!(advanced, 4);
        assert_eq!(fb.glyph_at(0, 3), b'3');
        assert_eq!(fb.glyph_at(0, 4), 0, "glyph written past the viewport's right edge");
    }

    #[test]
    fn print_writes_glyphs_using_current_colors() {
        let mut fb = Framebuffer::new(10, 5);
        let viewport = vp(10, 10);
        let mut state = TextState::default();
        let advanced = print(&mut fb, &viewport, &mut state, 0, 0, "hi");
        assert_eq!(advanced, 2);
        assert_eq!(fb.glyph_at(0, 0), b'h');
        assert_eq!(fb.glyph_at(0, 1), b'i');
        assert_eq!(fb.fg_at(0, 0), state.fg);
    }

    #[test]
    fn print_consumes_color_escapes_without_drawing_them() {
        let mut fb = Framebuffer::new(10, 5);
        let viewport = vp(10, 10);
        let mut state = TextState::default();
        // set fg to palette index 196 (pure red in the 6x6x6 cube), then print one char
        print(&mut fb, &viewport, &mut state, 0, 0, "\x1b[f196]x");
        assert_eq!(fb.glyph_at(0, 0), b'x');
        assert_eq!(fb.fg_at(0, 0), PackedColor::from_rgb(255, 0, 0));
    }
}
