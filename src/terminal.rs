//! Puts the display buffer on a truecolor terminal, two pixels per cell using half-blocks.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::surface::Surface;
use std::io::{self, Write};

pub struct Presenter {
    scale: usize,
    background: [f32; 3],
    output_buf: Vec<u8>,
}

impl Presenter {
    pub fn new(scale: usize, background: Color) -> Self {
        Self {
            scale: scale.max(1),
            background: [background.r, background.g, background.b],
            output_buf: Vec::new(),
        }
    }

    /// Canvas size covering a terminal of `cols` x `rows` cells.
    pub fn canvas_size(&self, cols: u16, rows: u16) -> (usize, usize) {
        (cols as usize * self.scale, rows as usize * 2 * self.scale)
    }

    /// Canvas point at the middle of a terminal cell.
    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        let s = self.scale as f32;
        ((col as f32 + 0.5) * s, (row as f32 + 0.5) * 2.0 * s)
    }

    /// Box-averages one `scale x scale` block and lights the background with it.
    fn sample(&self, buffer: &PixelBuffer, px: usize, py: usize) -> (u8, u8, u8) {
        let s = self.scale;
        let mut sum = [0.0f32; 3];
        for y in py * s..(py + 1) * s {
            for x in px * s..(px + 1) * s {
                let p = buffer.pixel(x, y);
                sum[0] += p[0];
                sum[1] += p[1];
                sum[2] += p[2];
            }
        }
        let n = (s * s) as f32;
        let channel = |c: usize| ((self.background[c] + sum[c] / n).min(1.0) * 255.0).round() as u8;
        (channel(0), channel(1), channel(2))
    }

    pub fn present<W: Write>(&mut self, buffer: &PixelBuffer, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let width = buffer.width() / self.scale;
        let height = buffer.height() / self.scale;

        let mut prev_top: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot: (u8, u8, u8) = (255, 255, 255);
        // Force the first cell of every row to emit both colors
        let mut fresh_row = true;

        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = self.sample(buffer, x, y);
                let bot = if y + 1 < height {
                    self.sample(buffer, x, y + 1)
                } else {
                    top
                };

                if fresh_row || top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if fresh_row || bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                fresh_row = false;
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            fresh_row = true;
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

/// Runs `show` between `enter` and `leave`.
///
/// `leave` runs on every path, including a half-finished `enter`, so the
/// terminal is never left in raw mode.
pub fn run_session<W: Write, T>(
    out: &mut W,
    enter: impl FnOnce(&mut W) -> io::Result<()>,
    show: impl FnOnce(&mut W) -> Result<T>,
    leave: impl FnOnce(&mut W) -> io::Result<()>,
) -> Result<T> {
    let result = enter(&mut *out)
        .map_err(Error::from)
        .and_then(|()| show(&mut *out));
    let restored = leave(&mut *out);
    let value = result?;
    restored?;
    Ok(value)
}
