//! Software raster surfaces.
//!
//! Executes a [`DisplayList`] into a pixel buffer, using fontdue for text
//! rasterization.
//!
//! ```text
//! Style → Layout → Paint → Raster → Composite
//!                    ↓        ↓          ↓
//!              DisplayList → Surface → window
//! ```
//!
//! A surface knows nothing about CSS, layout or the DOM. It executes drawing
//! commands and can copy a clipped region of itself onto another surface.

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use wombat_css::{
    Color, DisplayCommand, DisplayList, Font, FontMetrics, MAX_FONT_SIZE_PX, Rect,
};

use crate::fonts::{FontSet, FontdueFontMetrics};

/// An RGBA pixel buffer that display commands are drawn into.
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: RgbaImage,
}

impl Surface {
    /// A white surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// The pixel at (`x`, `y`), if inside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.buffer.get_pixel_checked(x, y).map(|pixel| pixel.0)
    }

    /// The underlying image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Fill the whole surface with one color.
    pub fn clear(&mut self, color: Color) {
        let rgba = Rgba([color.r, color.g, color.b, color.a]);
        for pixel in self.buffer.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Execute every command of a display list, in order.
    pub fn draw(&mut self, display_list: &DisplayList) {
        for command in display_list.commands() {
            self.execute(command);
        }
    }

    /// Draw the part of a display list that lies between `top` and
    /// `top + height()`, with `top` landing on the surface's first row.
    ///
    /// Commands entirely outside that band are skipped.
    pub fn draw_band(&mut self, display_list: &DisplayList, top: f32) {
        let bottom = top + self.height() as f32;
        for command in display_list.commands() {
            if command.intersects_band(top, bottom) {
                self.execute_shifted(command, -top);
            }
        }
    }

    /// Execute a single display command.
    pub fn execute(&mut self, command: &DisplayCommand) {
        self.execute_shifted(command, 0.0);
    }

    /// Execute `command` moved down by `dy`.
    fn execute_shifted(&mut self, command: &DisplayCommand, dy: f32) {
        let shift = |rect: &Rect| Rect::new(rect.x, rect.y + dy, rect.width, rect.height);
        match command {
            DisplayCommand::FillRect { rect, color } => self.fill_rect(&shift(rect), *color),
            DisplayCommand::RoundedRect {
                rect,
                radius,
                color,
            } => self.fill_rounded_rect(&shift(rect), *radius, *color),
            DisplayCommand::Outline {
                rect,
                color,
                thickness,
            } => self.outline(&shift(rect), *color, *thickness),
            DisplayCommand::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                thickness,
            } => self.line((*x1, *y1 + dy), (*x2, *y2 + dy), *color, *thickness),
            DisplayCommand::TextRun {
                x,
                y,
                text,
                font,
                color,
                ..
            } => self.draw_text(text, *x, *y + dy, font, *color),
        }
    }

    /// Copy the part of `source` that lands inside `clip` after translating
    /// it by (`dx`, `dy`).
    pub fn blit(&mut self, source: &Self, dx: f32, dy: f32, clip: &Rect) {
        let x0 = clip.x.max(0.0) as u32;
        let y0 = clip.y.max(0.0) as u32;
        let x1 = (clip.right().max(0.0) as u32).min(self.width());
        let y1 = (clip.bottom().max(0.0) as u32).min(self.height());
        for y in y0..y1 {
            let sy = y as f32 - dy;
            if sy < 0.0 {
                continue;
            }
            for x in x0..x1 {
                let sx = x as f32 - dx;
                if sx < 0.0 {
                    continue;
                }
                if let Some(pixel) = source.pixel(sx as u32, sy as u32) {
                    self.buffer.put_pixel(x, y, Rgba(pixel));
                }
            }
        }
    }

    /// Save the surface as an image file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.buffer
            .save(path)
            .with_context(|| format!("failed to save screenshot to '{}'", path.display()))
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.fill_where(rect, color, |_, _| true);
    }

    /// [§ 5.2 Corner shaping](https://www.w3.org/TR/css-backgrounds-3/#corner-shaping)
    fn fill_rounded_rect(&mut self, rect: &Rect, radius: f32, color: Color) {
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        self.fill_where(rect, color, |px, py| {
            let cx = px.clamp(rect.x + radius, rect.right() - radius);
            let cy = py.clamp(rect.y + radius, rect.bottom() - radius);
            (px - cx).hypot(py - cy) <= radius
        });
    }

    fn outline(&mut self, rect: &Rect, color: Color, thickness: f32) {
        let t = thickness;
        self.fill_rect(&Rect::new(rect.x, rect.y, rect.width, t), color);
        self.fill_rect(&Rect::new(rect.x, rect.bottom() - t, rect.width, t), color);
        self.fill_rect(&Rect::new(rect.x, rect.y, t, rect.height), color);
        self.fill_rect(&Rect::new(rect.right() - t, rect.y, t, rect.height), color);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, thickness: f32) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = dx.mul_add(t, from.0);
            let y = dy.mul_add(t, from.1);
            self.fill_rect(&Rect::new(x, y, thickness, thickness), color);
        }
    }

    /// Fill the pixels of `rect` whose centers satisfy `inside`.
    fn fill_where(&mut self, rect: &Rect, color: Color, inside: impl Fn(f32, f32) -> bool) {
        let x0 = rect.x.max(0.0).round() as u32;
        let y0 = rect.y.max(0.0).round() as u32;
        let x1 = (rect.right().max(0.0).round() as u32).min(self.width());
        let y1 = (rect.bottom().max(0.0).round() as u32).min(self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x as i32, y as i32, color, color.a);
                }
            }
        }
    }

    /// Draw `text` with its top edge at `top`. The baseline sits one ascent
    /// below it.
    fn draw_text(&mut self, text: &str, x: f32, top: f32, font: &Font, color: Color) {
        if !(font.size > 0.0 && font.size <= MAX_FONT_SIZE_PX) {
            return;
        }
        let Some(face) = FontSet::system().select(font.weight, font.style) else {
            return;
        };
        let baseline = top + FontdueFontMetrics.ascent(font);
        let mut cursor_x = x;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = face.rasterize(ch, font.size);
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline.round() as i32 - metrics.ymin - metrics.height as i32;
            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage > 0 {
                        let alpha = (u16::from(coverage) * u16::from(color.a) / 255) as u8;
                        self.blend(glyph_x + gx as i32, glyph_y + gy as i32, color, alpha);
                    }
                }
            }
            cursor_x += metrics.advance_width;
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: u8) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let Some(background) = self.buffer.get_pixel_checked(x, y).copied() else {
            return;
        };
        let foreground = Rgba([color.r, color.g, color.b, 255]);
        let pixel = if alpha == 255 {
            foreground
        } else {
            alpha_blend(foreground, background, alpha)
        };
        self.buffer.put_pixel(x, y, pixel);
    }
}

/// Alpha blend a foreground color onto a background color.
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wombat_css::{FontStyle, FontWeight};

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn test_new_surface_is_white() {
        let surface = Surface::new(4, 3);
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.height(), 3);
        assert_eq!(surface.pixel(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_rect_is_clipped_to_surface() {
        let mut surface = Surface::new(10, 10);
        surface.execute(&DisplayCommand::FillRect {
            rect: Rect::new(-5.0, 5.0, 100.0, 100.0),
            color: RED,
        });
        assert_eq!(surface.pixel(0, 5), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(9, 9), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 4), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_rounded_rect_leaves_corners() {
        let mut surface = Surface::new(20, 20);
        surface.execute(&DisplayCommand::RoundedRect {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            radius: 8.0,
            color: RED,
        });
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(10, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_outline_leaves_inside() {
        let mut surface = Surface::new(10, 10);
        surface.execute(&DisplayCommand::Outline {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: Color::BLACK,
            thickness: 1.0,
        });
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(9, 5), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_vertical_line() {
        let mut surface = Surface::new(10, 10);
        surface.execute(&DisplayCommand::Line {
            x1: 3.0,
            y1: 1.0,
            x2: 3.0,
            y2: 8.0,
            color: Color::BLACK,
            thickness: 1.0,
        });
        assert_eq!(surface.pixel(3, 1), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(3, 8), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(4, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_blit_translates_and_clips() {
        let mut page = Surface::new(10, 40);
        page.execute(&DisplayCommand::FillRect {
            rect: Rect::new(0.0, 20.0, 10.0, 10.0),
            color: RED,
        });
        let mut root = Surface::new(10, 20);
        // Scrolled by 15: page row 20 lands on root row 5, but only rows >= 8
        // are inside the clip.
        root.blit(&page, 0.0, -15.0, &Rect::new(0.0, 8.0, 10.0, 12.0));
        assert_eq!(root.pixel(0, 5), Some([255, 255, 255, 255]));
        assert_eq!(root.pixel(0, 8), Some([255, 0, 0, 255]));
        assert_eq!(root.pixel(0, 14), Some([255, 0, 0, 255]));
        assert_eq!(root.pixel(0, 15), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_band_shifts_and_skips() {
        let mut list = DisplayList::new();
        list.push(DisplayCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 5.0),
            color: Color::BLACK,
        });
        list.push(DisplayCommand::FillRect {
            rect: Rect::new(0.0, 100.0, 10.0, 5.0),
            color: RED,
        });
        let mut surface = Surface::new(10, 10);
        surface.draw_band(&list, 98.0);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(0, 2), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 7), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 8), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_oversized_text_is_not_rasterized() {
        let mut surface = Surface::new(10, 10);
        surface.execute(&DisplayCommand::TextRun {
            x: 0.0,
            y: 0.0,
            text: "x".to_string(),
            font: Font::new(f32::INFINITY, FontWeight::Normal, FontStyle::Roman),
            color: Color::BLACK,
            height: 10.0,
        });
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_alpha_blend_halfway() {
        let blended = alpha_blend(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255]), 128);
        assert!((125..=128).contains(&blended[0]));
        assert_eq!(blended[3], 255);
    }
}
