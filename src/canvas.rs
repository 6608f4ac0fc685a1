//! `Canvas`: the public drawing/input surface. Owns a `Framebuffer`, a
//! `Viewport`, a buffered stdout writer, and a `Host` terminal lease, playing
//! the role the teacher's `Renderer` plays but scoped to this crate's
//! rasterizer and paint pass instead of a retained widget tree.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};

use crate::color::PackedColor;
use crate::framebuffer::Framebuffer;
use crate::host::Host;
use crate::paint;
use crate::raster::{line, triangle};
use crate::text::{self, TextState};
use crate::viewport::{Vertex, Viewport};

/// A truecolor half-block canvas bound to one terminal. `Canvas` is not
/// `Send`/`Sync` (it wraps raw terminal I/O state) and is meant for
/// single-threaded use, matching the single-threaded-and-synchronous
/// concurrency model: no suspension points, one framebuffer per canvas.
pub struct Canvas {
    fb: Framebuffer,
    viewport: Viewport,
    text_state: TextState,
    writer: BufWriter<io::Stdout>,
    host: Host,
    top_offset: i32,
    cols: u16,
    rows: u16,
}

impl Canvas {
    /// Initialize a canvas. `width`/`height` are terminal cell columns/rows;
    /// pass `None`/`None` to auto-detect via the host adapter's size probe.
    /// If the probe fails (no TTY, piped output) the canvas degrades to 0x0:
    /// initialization still succeeds and every draw becomes a no-op.
    pub fn init(width: Option<u16>, height: Option<u16>) -> Result<Canvas> {
        let host = Host::init()?;

        let (cols, rows) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => Host::probe_size(),
        };

        let mut writer = BufWriter::new(io::stdout());
        let top_offset = if rows > 0 {
            Self::reserve_rows(&mut writer, rows)?
        } else {
            0
        };

        let mut fb = Framebuffer::new(cols as usize, rows as usize);
        let viewport = Viewport::new(0, 0, cols as i32, fb.pixel_rows() as i32, cols as i32, fb.pixel_rows() as i32);
        fb.mark_all_dirty();

        Ok(Canvas {
            fb,
            viewport,
            text_state: TextState::default(),
            writer,
            host,
            top_offset,
            cols,
            rows,
        })
    }

    /// Write `rows - 1` blank lines to make room for the canvas, then query
    /// where the cursor landed to work out the canvas's top row, mirroring
    /// the source's row-reservation trick in `tz_init`.
    fn reserve_rows(writer: &mut BufWriter<io::Stdout>, rows: u16) -> Result<i32> {
        for _ in 0..rows.saturating_sub(1) {
            writer.write_all(b"\n").context("reserving canvas rows")?;
        }
        writer.flush().context("flushing row reservation")?;
        let (_, cursor_row) = crossterm::cursor::position().context("querying cursor position")?;
        Ok(compute_top_offset(rows, cursor_row))
    }

    pub fn width(&self) -> u16 {
        self.cols
    }

    pub fn height(&self) -> u16 {
        self.rows
    }

    pub fn viewport(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.viewport = Viewport::new(x, y, w, h, self.fb.cols() as i32, self.fb.pixel_rows() as i32);
    }

    pub fn clear(&mut self) {
        self.fb.clear(&self.viewport);
    }

    pub fn print(&mut self, x: i32, y: i32, text: &str) -> i32 {
        text::print(&mut self.fb, &self.viewport, &mut self.text_state, x, y, text)
    }

    pub fn blit(&mut self, x: i32, y: i32, w: i32, h: i32, data: &[PackedColor]) {
        text::blit(&mut self.fb, &self.viewport, x, y, w, h, data);
    }

    pub fn line(&mut self, v0: Vertex, v1: Vertex) {
        line::rasterize_line(&mut self.fb, &self.viewport, v0, v1);
    }

    pub fn triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) {
        triangle::rasterize_triangle(&mut self.fb, &self.viewport, v0, v1, v2);
    }

    /// Drain the dirty map to the terminal, then drain any input that arrived
    /// during the frame so a stray Ctrl-C is observed promptly (mirrors the
    /// source's post-paint drain loop).
    pub fn paint(&mut self) -> Result<()> {
        paint::paint(&mut self.fb, self.top_offset, &mut self.writer).context("writing to terminal")?;
        self.writer.flush().context("flushing paint output")?;

        let mut scratch = [0u8; 32];
        while self.host.can_read()? {
            if self.host.read(&mut scratch)? == 0 {
                break;
            }
        }
        Ok(())
    }

    pub fn can_read(&mut self) -> Result<bool> {
        self.host.can_read()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.host.read(buf)
    }

    /// Whether a `Ctrl-C` has been observed on stdin since the last time this
    /// flag mattered to the caller. The library never raises a real signal;
    /// callers that need the TTY restored on their own exit path should stop
    /// iterating once this is set and let `Canvas` drop.
    pub fn interrupted(&self) -> bool {
        self.host.interrupted()
    }

    /// Draw `prompt` at logical-pixel row `y`, then read and echo a line of
    /// input into `out` until Enter, NUL, or interrupt. Returns the number of
    /// characters read. Line editing is limited to backspace, matching the
    /// source's `tz_prompt` (which leaves escape-sequence history/editing as
    /// an explicit follow-up).
    pub fn prompt(&mut self, y: i32, prompt: &str, out: &mut String) -> Result<usize> {
        let row = prompt_row(self.viewport.y0, y);
        write!(self.writer, "\x1b[{};1H", 1 + self.top_offset + row).context("writing cursor move")?;
        write!(self.writer, "{prompt}").context("writing prompt text")?;
        self.writer.flush().context("flushing prompt")?;

        out.clear();
        loop {
            if self.host.interrupted() {
                break;
            }
            let mut buf = [0u8; 4];
            let n = self.host.read_blocking(&mut buf)?;
            if n == 0 {
                break;
            }
            match buf[0] {
                b'\0' | b'\r' => break,
                0x7f => {
                    if out.pop().is_some() {
                        write!(self.writer, "\x08 \x08").context("writing backspace echo")?;
                        self.writer.flush().context("flushing backspace echo")?;
                    }
                }
                c if c.is_ascii_graphic() || c == b' ' => {
                    let ch = c as char;
                    out.push(ch);
                    write!(self.writer, "{ch}").context("echoing input character")?;
                    self.writer.flush().context("flushing echo")?;
                }
                _ => {}
            }
        }

        write!(self.writer, "\x1b[1K").context("erasing prompt line")?;
        self.writer.flush().context("flushing prompt erase")?;
        Ok(out.len())
    }
}

/// After writing `rows - 1` blank lines, the cursor sits at the bottom of the
/// reserved block; the canvas's top row is that minus `rows - 1`.
fn compute_top_offset(rows: u16, cursor_row: u16) -> i32 {
    cursor_row as i32 - (rows as i32 - 1)
}

/// `prompt`'s row argument is a logical-pixel y, viewport-relative; the
/// source does `y += tz.y0; row = y >> 1`.
fn prompt_row(viewport_y0: i32, y: i32) -> i32 {
    (y + viewport_y0) >> 1
}

impl Drop for Canvas {
    /// Restore the cursor below the canvas and reset SGR attributes — the
    /// Rust equivalent of the source's `tz_reset`. Cursor visibility and raw
    /// mode are restored afterward by `Host`'s own `Drop` impl.
    fn drop(&mut self) {
        let bottom_row = 1 + self.top_offset + self.rows as i32;
        let _ = write!(self.writer, "\x1b[{bottom_row};1H\x1b[0m");
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_offset_accounts_for_reserved_rows() {
        // 4 rows reserved (3 newlines written), cursor lands on row 10 (0-based)
        assert_eq!(compute_top_offset(4, 10), 7);
    }

    #[test]
    fn top_offset_is_cursor_row_when_only_one_row_reserved() {
        assert_eq!(compute_top_offset(1, 5), 5);
    }

    #[test]
    fn prompt_row_halves_the_viewport_relative_pixel_y() {
        assert_eq!(prompt_row(0, 0), 0);
        assert_eq!(prompt_row(0, 3), 1);
        assert_eq!(prompt_row(2, 0), 1);
    }
}
