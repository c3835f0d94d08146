//! Title typeface loading and single-glyph rasterization.
//!
//! The renderer draws one character per tile, so this module only needs
//! per-character advance widths and a centered glyph raster. A TrueType face
//! is preferred; when the file is missing or unparsable we degrade to a small
//! built-in bitmap face instead of failing the whole render.

use std::path::Path;

use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use tracing::warn;

/// A loaded title typeface.
pub enum TitleFont {
    Truetype(Font<'static>),
    /// 5x7 bitmap fallback face, uppercase-only coverage.
    Builtin,
}

impl TitleFont {
    /// Load a TrueType file, falling back to the built-in face on any failure.
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => match Font::try_from_vec(bytes) {
                Some(font) => TitleFont::Truetype(font),
                None => {
                    warn!(path = %path.display(), "font not parsable, using built-in face");
                    TitleFont::Builtin
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "font not readable, using built-in face");
                TitleFont::Builtin
            }
        }
    }

    /// Horizontal advance of `ch` at `px` pixels.
    pub fn advance(&self, ch: char, px: f32) -> f32 {
        match self {
            TitleFont::Truetype(font) => {
                font.glyph(ch)
                    .scaled(Scale::uniform(px))
                    .h_metrics()
                    .advance_width
            }
            TitleFont::Builtin => builtin::advance(px),
        }
    }

    /// Render `ch` centered into a transparent square tile of side `2 * px`,
    /// filled with `color` modulated by glyph coverage.
    pub fn glyph_tile(&self, ch: char, px: f32, color: Rgba<u8>) -> RgbaImage {
        let side = (px * 2.0).ceil().max(2.0) as u32;
        let mut tile = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
        match self {
            TitleFont::Truetype(font) => draw_truetype(font, ch, px, color, &mut tile),
            TitleFont::Builtin => builtin::draw(ch, px, color, &mut tile),
        }
        tile
    }
}

fn draw_truetype(font: &Font<'static>, ch: char, px: f32, color: Rgba<u8>, tile: &mut RgbaImage) {
    let glyph = font
        .glyph(ch)
        .scaled(Scale::uniform(px))
        .positioned(point(0.0, 0.0));

    let Some(bb) = glyph.pixel_bounding_box() else {
        return; // whitespace or an empty glyph
    };

    let side = tile.width() as i32;
    let off_x = (side - bb.width()) / 2 - bb.min.x;
    let off_y = (side - bb.height()) / 2 - bb.min.y;

    glyph.draw(|gx, gy, coverage| {
        let tx = bb.min.x + gx as i32 + off_x;
        let ty = bb.min.y + gy as i32 + off_y;
        if tx < 0 || ty < 0 || tx >= side || ty >= side {
            return;
        }
        let alpha = (coverage * f32::from(color.0[3])).round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            return;
        }
        tile.put_pixel(
            tx as u32,
            ty as u32,
            Rgba([color.0[0], color.0[1], color.0[2], alpha]),
        );
    });
}

mod builtin {
    use image::{Rgba, RgbaImage};

    /// Glyph cell grid: 5 columns x 7 rows, row bits MSB-left.
    const COLS: f32 = 5.0;
    const ROWS: f32 = 7.0;
    /// Advance is one cell wider than the glyph box.
    const ADVANCE_CELLS: f32 = 6.0;

    pub fn advance(px: f32) -> f32 {
        px * ADVANCE_CELLS / ROWS
    }

    pub fn draw(ch: char, px: f32, color: Rgba<u8>, tile: &mut RgbaImage) {
        let Some(rows) = glyph_rows(ch) else {
            return;
        };

        let cell = px / ROWS;
        let glyph_w = cell * COLS;
        let glyph_h = px;
        let (tw, th) = (tile.width() as f32, tile.height() as f32);
        let origin_x = (tw - glyph_w) / 2.0;
        let origin_y = (th - glyph_h) / 2.0;

        let (tile_w, tile_h) = (tile.width(), tile.height());
        for (ty, tx) in (0..tile_h).flat_map(|y| (0..tile_w).map(move |x| (y, x))) {
            let gx = (tx as f32 + 0.5 - origin_x) / cell;
            let gy = (ty as f32 + 0.5 - origin_y) / cell;
            if gx < 0.0 || gy < 0.0 || gx >= COLS || gy >= ROWS {
                continue;
            }
            let bit = 4 - gx as u32;
            if rows[gy as usize] >> bit & 1 == 1 {
                tile.put_pixel(tx, ty, color);
            }
        }
    }

    fn glyph_rows(ch: char) -> Option<[u8; 7]> {
        let ch = ch.to_ascii_uppercase();
        let rows = match ch {
            'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
            'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
            'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
            'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
            'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
            'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
            'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
            'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
            'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
            'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
            'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
            'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
            'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
            'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
            'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
            'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
            'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
            'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
            'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
            'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
            'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
            'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
            'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
            '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
            '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
            '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
            '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
            '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
            '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
            '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
            '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
            '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
            '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
            '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
            '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
            '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
            '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
            '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
            '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
            _ => return None,
        };
        Some(rows)
    }
}
