//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{color_for, GameSnapshot, PieceBuffer};
use crate::fb::{FrameBuffer, Rgb, Style};
use crate::types::{Cell, Color, Phase, SHAPE_SIZE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const BACKGROUND: Rgb = Rgb::new(30, 30, 40);
const SCREEN: Rgb = Rgb::new(0, 0, 0);
const WALL: Rgb = Rgb::new(130, 130, 140);
const LOCKED: Rgb = Rgb::new(170, 170, 170);
const FADING: Rgb = Rgb::new(250, 250, 250);

/// Panel columns needed for the 4x4 previews
const PANEL_MIN_W: u16 = 10;

/// Fading rows alternate every this many ticks
const FLASH_TICKS: u64 = 4;

/// Terminal colour of a catalogue colour.
pub fn color_rgb(color: Color) -> Rgb {
    match color {
        Color::Yellow => Rgb::new(240, 220, 80),
        Color::Orange => Rgb::new(255, 165, 0),
        Color::Blue => Rgb::new(80, 120, 220),
        Color::Cyan => Rgb::new(80, 220, 220),
        Color::Purple => Rgb::new(200, 120, 220),
        Color::Green => Rgb::new(100, 220, 120),
        Color::Red => Rgb::new(220, 80, 80),
    }
}

/// Renders the grid, a side panel and the phase screens
#[derive(Debug, Clone)]
pub struct GameView {
    /// Grid cell width in terminal columns.
    cell_w: u16,
    /// Grid cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 compensates for the usual terminal glyph aspect ratio.
        Self { cell_w: 2, cell_h: 1 }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Size of the grid area in terminal cells
    pub fn grid_extent(&self, snap: &GameSnapshot) -> (u16, u16) {
        let w = u16::try_from(snap.cols).unwrap_or(u16::MAX);
        let h = u16::try_from(snap.rows).unwrap_or(u16::MAX);
        (w.saturating_mul(self.cell_w), h.saturating_mul(self.cell_h))
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Style::new(SCREEN, SCREEN).glyph(' '));

        let (grid_w, grid_h) = self.grid_extent(snap);
        let panel_w = if viewport.width >= grid_w + 2 + PANEL_MIN_W {
            PANEL_MIN_W
        } else {
            0
        };
        let total_w = grid_w + if panel_w > 0 { 2 + panel_w } else { 0 };
        let origin_x = viewport.width.saturating_sub(total_w) / 2;
        let origin_y = viewport.height.saturating_sub(grid_h) / 2;

        match snap.phase {
            Phase::Init | Phase::AwaitingStart => {
                self.draw_title(fb, origin_x, origin_y, grid_w, grid_h);
                return;
            }
            Phase::Playing | Phase::Paused | Phase::GameOver => {}
        }

        self.draw_grid(fb, snap, origin_x, origin_y);
        if panel_w > 0 {
            self.draw_panel(fb, snap, origin_x + grid_w + 2, origin_y);
        }

        match snap.phase {
            Phase::Paused => self.draw_banner(fb, origin_x, origin_y, grid_w, grid_h, &["PAUSED"]),
            Phase::GameOver => self.draw_banner(
                fb,
                origin_x,
                origin_y,
                grid_w,
                grid_h,
                &["GAME OVER", "ENTER: again"],
            ),
            _ => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_grid(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x0: u16, y0: u16) {
        let moving_fg = snap
            .flags
            .current_piece_id
            .map_or(LOCKED, |kind| color_rgb(color_for(kind)));
        let flash = (snap.tick / FLASH_TICKS) % 2 == 0;

        for row in 0..snap.rows {
            for col in 0..snap.cols {
                let Some(cell) = snap.cell(row, col) else {
                    continue;
                };
                let (ch, style) = match cell {
                    Cell::Empty => ('·', Style::new(Rgb::new(70, 70, 80), BACKGROUND).dim()),
                    Cell::Moving => ('█', Style::new(moving_fg, BACKGROUND).bold()),
                    Cell::Full => ('█', Style::new(LOCKED, BACKGROUND)),
                    Cell::Wall => ('▓', Style::new(WALL, SCREEN)),
                    Cell::Fading if flash => ('█', Style::new(FADING, BACKGROUND).bold()),
                    Cell::Fading => ('░', Style::new(FADING.darken(140), BACKGROUND)),
                };
                let px = x0 + col as u16 * self.cell_w;
                let py = y0 + row as u16 * self.cell_h;
                fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
            }
        }
    }

    fn draw_panel(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x: u16, y0: u16) {
        let label = Style::default().bold();
        let value = Style::new(Rgb::new(200, 200, 200), SCREEN);

        let mut y = y0;
        for (name, number) in [
            ("LEVEL", snap.flags.level),
            ("LINES", snap.lines),
            ("SPEED", snap.flags.speed),
        ] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, number, value);
            y += 3;
        }

        fb.put_str(x, y, "NEXT", label);
        self.draw_preview(fb, &snap.incoming, x, y + 1, true);
        y += 2 + SHAPE_SIZE as u16;

        fb.put_str(x, y, "HOLD", label);
        self.draw_preview(fb, &snap.held, x, y + 1, snap.hold_available);
    }

    fn draw_preview(&self, fb: &mut FrameBuffer, buffer: &PieceBuffer, x: u16, y: u16, lit: bool) {
        let Some(kind) = buffer.kind() else {
            fb.put_str(x, y, "-", Style::default().dim());
            return;
        };
        let mut style = Style::new(color_rgb(color_for(kind)), SCREEN);
        if !lit {
            style = style.dim();
        }
        for (r, c) in buffer.shape().occupied() {
            let px = x + c as u16 * self.cell_w;
            fb.fill_rect(px, y + r as u16, self.cell_w, 1, '█', style);
        }
    }

    fn draw_title(&self, fb: &mut FrameBuffer, x0: u16, y0: u16, w: u16, h: u16) {
        self.draw_banner(fb, x0, y0, w, h, &["BLOCKFALL", "", "ENTER: start", "Q: quit"]);
    }

    fn draw_banner(&self, fb: &mut FrameBuffer, x0: u16, y0: u16, w: u16, h: u16, lines: &[&str]) {
        let style = Style::new(Rgb::new(255, 255, 255), SCREEN).bold();
        let box_h = lines.len() as u16 + 2;
        let box_y = y0 + h.saturating_sub(box_h) / 2;

        fb.fill_rect(x0, box_y, w, box_h, ' ', style);
        fb.draw_box(x0, box_y, w, box_h, style);
        for (i, line) in lines.iter().enumerate() {
            fb.put_str_centered(x0, box_y + 1 + i as u16, w, line, style);
        }
    }
}
