//! An in-memory RGBA canvas.
//!
//! Text is drawn with the Spleen 12x24 bitmap font scaled to the requested
//! pixel height, or with a TrueType font through ab_glyph when one is
//! configured. Both paths alpha-blend the fill colour over the bitmap.

use ab_glyph::{Font, FontArc, ScaleFont};
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use spleen_font::{FONT_12X24, PSF2Font};
use std::io::Cursor;
use std::path::Path;

use crate::error::PtimeError;

use super::host::{Canvas, TextStyle};

const SPLEEN_W: usize = 12;
const SPLEEN_H: usize = 24;
/// Rows of the 12x24 cell above the baseline.
const SPLEEN_ASCENT: usize = 19;

/// Default canvas size for the earth page.
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, PtimeError> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| PtimeError::Font(format!("{}: {}", path.display(), e)))
}

/// Drawing surface backed by an [`RgbaImage`]. Starts fully transparent.
pub struct RasterCanvas {
    image: RgbaImage,
    ttf: Option<FontArc>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            ttf: None,
        }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.ttf = Some(font);
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, PtimeError> {
        let mut buf = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| PtimeError::Image(format!("Failed to encode PNG: {}", e)))?;
        Ok(buf.into_inner())
    }

    /// Source-over blend of `color` at `coverage` into one pixel.
    fn blend(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src_a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for c in 0..3 {
            let s = color[c] as f32 * src_a;
            let d = dst[c] as f32 * dst_a * (1.0 - src_a);
            dst[c] = ((s + d) / out_a).round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    fn fill_text_bitmap(&mut self, text: &str, x: i64, y: i64, style: &TextStyle) {
        let scale = style.size_px / SPLEEN_H as f32;
        let cell_w = ((SPLEEN_W as f32 * scale).round() as usize).max(1);
        let cell_h = ((SPLEEN_H as f32 * scale).round() as usize).max(1);
        let top = y - (SPLEEN_ASCENT as f32 * scale).round() as i64;

        let Ok(mut font) = PSF2Font::new(FONT_12X24) else {
            log::warn!("Spleen 12x24 font failed to load");
            return;
        };

        let mut cursor_x = x;
        for ch in text.chars() {
            let utf8 = ch.to_string();
            let mut cell = [[false; SPLEEN_W]; SPLEEN_H];
            if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < SPLEEN_H && col_x < SPLEEN_W {
                            cell[row_y][col_x] = on;
                        }
                    }
                }
            }

            // Nearest-neighbour scale from the 12x24 cell.
            for dy in 0..cell_h {
                for dx in 0..cell_w {
                    if cell[dy * SPLEEN_H / cell_h][dx * SPLEEN_W / cell_w] {
                        self.blend(cursor_x + dx as i64, top + dy as i64, style.fill, 1.0);
                    }
                }
            }
            cursor_x += cell_w as i64;
        }
    }

    fn fill_text_ttf(&mut self, font: &FontArc, text: &str, x: i64, y: i64, style: &TextStyle) {
        let scaled = font.as_scaled(style.size_px);
        let mut caret_x = x as f32;

        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            let glyph =
                glyph_id.with_scale_and_position(style.size_px, ab_glyph::point(caret_x, y as f32));
            caret_x += scaled.h_advance(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let mut coverage = Vec::new();
                outlined.draw(|px, py, c| coverage.push((px, py, c)));
                for (px, py, c) in coverage {
                    let gx = px as i64 + bounds.min.x as i64;
                    let gy = py as i64 + bounds.min.y as i64;
                    self.blend(gx, gy, style.fill, c);
                }
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, image, x, y);
    }

    fn fill_text(&mut self, text: &str, x: i64, y: i64, style: &TextStyle) {
        match self.ttf.clone() {
            Some(font) => self.fill_text_ttf(&font, text, x, y, style),
            None => self.fill_text_bitmap(text, x, y, style),
        }
    }
}
