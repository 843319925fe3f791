//! TerminalRenderer: flushes framebuffers to a terminal, sending only the
//! glyphs that changed since the previous frame.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{FrameBuffer, Glyph, Rgb, Style};

/// Queues crossterm commands into a byte buffer, skipping redundant style
/// changes and cursor moves.
struct Encoder<'a> {
    out: &'a mut Vec<u8>,
    style: Option<Style>,
    /// Where the terminal cursor sits after the last print
    cursor: Option<(u16, u16)>,
}

impl<'a> Encoder<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            out,
            style: None,
            cursor: None,
        }
    }

    fn glyph(&mut self, x: u16, y: u16, glyph: Glyph) -> Result<()> {
        if self.cursor != Some((x, y)) {
            self.out.queue(cursor::MoveTo(x, y))?;
        }
        if self.style != Some(glyph.style) {
            apply_style(self.out, glyph.style)?;
            self.style = Some(glyph.style);
        }
        self.out.queue(Print(glyph.ch))?;
        self.cursor = Some((x.saturating_add(1), y));
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut enc = Encoder::new(out);
    for y in 0..fb.height() {
        if let Some(line) = fb.line(y) {
            for (x, glyph) in line.iter().enumerate() {
                enc.glyph(x as u16, y, *glyph)?;
            }
        }
    }
    enc.finish()
}

/// Encode only the glyphs that differ between `prev` and `next`.
///
/// Frames of different sizes fall back to a full redraw.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    if (prev.width(), prev.height()) != (next.width(), next.height()) {
        return encode_full_into(next, out);
    }

    let mut enc = Encoder::new(out);
    for (x, y, len) in changed_runs(prev, next) {
        for dx in 0..len {
            enc.glyph(x + dx, y, next.get(x + dx, y).unwrap_or_default())?;
        }
    }
    enc.finish()
}

/// `(x, y, len)` spans of consecutive changed glyphs, row by row.
fn changed_runs<'a>(
    prev: &'a FrameBuffer,
    next: &'a FrameBuffer,
) -> impl Iterator<Item = (u16, u16, u16)> + 'a {
    (0..next.height()).flat_map(move |y| {
        let a = prev.line(y).unwrap_or(&[]);
        let b = next.line(y).unwrap_or(&[]);
        let mut runs = Vec::new();
        let mut start: Option<usize> = None;
        for x in 0..b.len() {
            let changed = a.get(x) != b.get(x);
            match (changed, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s as u16, y, (x - s) as u16));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s as u16, y, (b.len() - s) as u16));
        }
        runs
    })
}

fn apply_style(out: &mut Vec<u8>, style: Style) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(to_color(style.fg)))?;
    out.queue(SetBackgroundColor(to_color(style.bg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Owns the terminal session and the previously presented frame.
pub struct TerminalRenderer<W: Write = io::Stdout> {
    out: W,
    prev: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalRenderer<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            prev: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next frame to be a full redraw (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.prev = None;
    }

    /// Present `fb`, then swap it with the previous frame.
    ///
    /// On return `fb` holds stale contents the caller can render over, so
    /// one pair of buffers serves every frame.
    pub fn present(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        match self.prev.as_mut() {
            Some(prev) => {
                encode_diff_into(prev, fb, &mut self.buf)?;
                std::mem::swap(prev, fb);
            }
            None => {
                encode_full_into(fb, &mut self.buf)?;
                let mut prev = FrameBuffer::new(fb.width(), fb.height());
                std::mem::swap(&mut prev, fb);
                self.prev = Some(prev);
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}
