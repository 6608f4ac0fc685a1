//! The dirty-bitmap-driven paint pass: walks the framebuffer's dirty words and
//! emits the minimal ANSI escape sequence needed to bring the terminal in sync.

use std::io::Write;

use anyhow::{Context, Result};

use crate::color::PackedColor;
use crate::framebuffer::Framebuffer;

/// Paint every dirty cell of `fb` to `writer`, wrapped in a synchronized-update
/// bracket. `top_offset` is the terminal row (0-based) the canvas's first cell
/// row occupies.
pub fn paint<W: Write>(fb: &mut Framebuffer, top_offset: i32, writer: &mut W) -> Result<()> {
    write!(writer, "\x1b[?2026h").context("writing synchronized-update begin")?;

    let mut last_fg: Option<PackedColor> = None;
    let mut last_bg: Option<PackedColor> = None;
    let mut last_row: Option<i32> = None;
    let mut last_col: Option<i32> = None;

    let rows = fb.rows();
    let words_per_row = fb.words_per_row();
    let cols = fb.cols();

    for row in 0..rows {
        for word in 0..words_per_row {
            let mut dirty = fb.take_dirty_word(row, word);
            while dirty != 0 {
                let bit = dirty.trailing_zeros() as usize;
                dirty &= dirty - 1;

                let col = word * 64 + bit;
                if col >= cols {
                    continue;
                }

                let fg = fb.fg_at(row, col);
                let bg = fb.bg_at(row, col);
                let glyph = fb.glyph_at(row, col);

                let at_cursor = last_row == Some(row as i32) && last_col == Some(col as i32);
                if !at_cursor {
                    write!(writer, "\x1b[{};{}H", 1 + top_offset + row as i32, 1 + col as i32)
                        .context("writing cursor move")?;
                }

                if last_fg != Some(fg) {
                    write!(writer, "\x1b[38;2;{};{};{}m", fg.r(), fg.g(), fg.b())
                        .context("writing foreground SGR")?;
                }
                if last_bg != Some(bg) {
                    write!(writer, "\x1b[48;2;{};{};{}m", bg.r(), bg.g(), bg.b())
                        .context("writing background SGR")?;
                }

                if glyph != 0 {
                    writer.write_all(&[glyph]).context("writing glyph")?;
                } else {
                    write!(writer, "\u{2580}").context("writing half-block glyph")?;
                }

                last_fg = Some(fg);
                last_bg = Some(bg);
                last_row = Some(row as i32);
                last_col = Some(col as i32 + 1);
            }
        }
    }

    write!(writer, "\x1b[0m").context("writing SGR reset")?;
    write!(writer, "\x1b[?2026l").context("writing synchronized-update end")?;

    Ok(())
}
