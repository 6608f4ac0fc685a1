//! Terminal host adapter: raw mode, cursor visibility, and a non-blocking
//! stdin poll, built on `crossterm` so the same adapter works unmodified on
//! Linux, macOS, and Windows terminals.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Owns the raw-mode lease and cursor-visibility state for one `Canvas`.
/// `Drop` restores both — the Rust-idiomatic substitute for the source's
/// `sigaction`-based SIGINT handler plus `atexit(tz_reset)` pair.
pub struct Host {
    interrupted: bool,
}

impl Host {
    /// Enable raw mode and hide the cursor. Size probing is a separate,
    /// infallible call so `Canvas::init` can fall back to a 0x0 canvas
    /// without tearing the host back down.
    pub fn init() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().context("enabling raw mode")?;
        crossterm::execute!(io::stdout(), crossterm::cursor::Hide).context("hiding cursor")?;
        Ok(Host { interrupted: false })
    }

    /// Probe the terminal's column/row count. Returns `(0, 0)` on failure (no
    /// TTY, piped output, etc.) so the caller can degrade to a zero-sized
    /// canvas rather than fail initialization.
    pub fn probe_size() -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((0, 0))
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Non-blocking readability poll.
    pub fn can_read(&self) -> Result<bool> {
        crossterm::event::poll(Duration::ZERO).context("polling stdin")
    }

    /// Best-effort, non-blocking read of up to `buf.len()` bytes. Converts
    /// the next queued crossterm key event back to raw bytes for API
    /// compatibility with the byte-oriented surface in the public API. A
    /// `Ctrl-C` sets the interrupt flag instead of raising a real signal.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || !self.can_read()? {
            return Ok(0);
        }
        let event = crossterm::event::read().context("reading stdin")?;
        Ok(self.consume_event(event, buf))
    }

    /// Blocking read: waits for the next key event before returning, used by
    /// `Canvas::prompt` where the source's `tz_read` is a blocking `read(2)`.
    pub fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let event = crossterm::event::read().context("reading stdin")?;
        Ok(self.consume_event(event, buf))
    }

    fn consume_event(&mut self, event: Event, buf: &mut [u8]) -> usize {
        let Event::Key(KeyEvent { code, modifiers, .. }) = event else {
            return 0;
        };
        let bytes = key_to_bytes(code, modifiers);
        if bytes.first() == Some(&0x03) {
            self.interrupted = true;
        }
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        n
    }
}

/// Convert a crossterm key event back into the raw byte(s) a POSIX terminal
/// would have delivered in cooked-off raw mode, since the public API is
/// byte-oriented (`can_read`/`read`) rather than event-oriented.
fn key_to_bytes(code: KeyCode, modifiers: KeyModifiers) -> Vec<u8> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = code {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii_alphabetic() {
                return vec![(upper as u8) & 0x1f];
            }
        }
    }
    match code {
        KeyCode::Char(c) => {
            let mut scratch = [0u8; 4];
            c.encode_utf8(&mut scratch).as_bytes().to_vec()
        }
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![0x1b],
        KeyCode::Tab => vec![b'\t'],
        _ => Vec::new(),
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
