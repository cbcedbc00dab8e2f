//! Procedural textures for artworks without a usable image.
//!
//! The gradient and border colours are derived from the artwork id, so the
//! same artwork always gets the same fallback. Captions are rasterized with
//! `fontdue` when a font is configured; without one, each character is drawn
//! as a solid block so the title still reads as a line of text.

use std::path::Path;

use fontdue::{Font, FontSettings};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use vernissage_model::ArtworkRef;

use crate::infra::constants::media::MIN_FALLBACK_TEXTURE_SIZE;

const BORDER_PX: u32 = 4;
const CAPTION_SCALE: f32 = 0.09;
const CAPTION_MARGIN: u32 = 14;
// Larger photos are scaled down before upload
const MAX_PHOTO_EDGE: u32 = 1024;

pub struct FallbackPainter {
    size: u32,
    font: Option<Font>,
}

impl std::fmt::Debug for FallbackPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackPainter")
            .field("size", &self.size)
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl FallbackPainter {
    /// Create a painter producing `size`-pixel square textures, at least
    /// [`MIN_FALLBACK_TEXTURE_SIZE`]. A font that cannot be read or parsed is
    /// logged and ignored.
    pub fn new(size: u32, font_path: Option<&Path>) -> Self {
        let font = font_path.and_then(|path| match std::fs::read(path) {
            Ok(bytes) => match Font::from_bytes(bytes, FontSettings::default()) {
                Ok(font) => Some(font),
                Err(err) => {
                    log::warn!("Ignoring caption font {}: {err}", path.display());
                    None
                }
            },
            Err(err) => {
                log::warn!("Cannot read caption font {}: {err}", path.display());
                None
            }
        });
        Self {
            size: size.max(MIN_FALLBACK_TEXTURE_SIZE),
            font,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Paint the fallback texture for an artwork.
    pub fn paint(&self, art: &ArtworkRef) -> RgbaImage {
        let digest = art.id.digest();
        let hue = (digest % 360) as f32;
        let top = hsl_to_rgb(hue, 0.55, 0.32);
        let bottom = hsl_to_rgb((hue + 40.0) % 360.0, 0.60, 0.14);
        let border = hsl_to_rgb(hue, 0.70, 0.62);

        let size = self.size;
        let mut canvas = RgbaImage::from_fn(size, size, |x, y| {
            let on_border = x < BORDER_PX
                || y < BORDER_PX
                || x >= size - BORDER_PX
                || y >= size - BORDER_PX;
            if on_border {
                return Rgba([border[0], border[1], border[2], 255]);
            }
            let t = y as f32 / (size - 1) as f32;
            Rgba([
                lerp_u8(top[0], bottom[0], t),
                lerp_u8(top[1], bottom[1], t),
                lerp_u8(top[2], bottom[2], t),
                255,
            ])
        });

        self.draw_caption(&mut canvas, &art.caption());
        canvas
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, text: &str) {
        let px = (self.size as f32 * CAPTION_SCALE).max(6.0);
        let inset = BORDER_PX + CAPTION_MARGIN;
        let baseline = self.size.saturating_sub(inset);
        let max_x = self.size.saturating_sub(inset);
        let mut pen_x = (BORDER_PX + CAPTION_MARGIN) as f32;

        match &self.font {
            Some(font) => {
                for ch in text.chars() {
                    let (metrics, coverage) = font.rasterize(ch, px);
                    if pen_x as u32 + metrics.width as u32 > max_x {
                        break;
                    }
                    let origin_x = pen_x as i64 + i64::from(metrics.xmin);
                    let origin_y = i64::from(baseline)
                        - metrics.height as i64
                        - i64::from(metrics.ymin);
                    for row in 0..metrics.height {
                        for col in 0..metrics.width {
                            let alpha = coverage[row * metrics.width + col];
                            blend_white(
                                canvas,
                                origin_x + col as i64,
                                origin_y + row as i64,
                                alpha,
                            );
                        }
                    }
                    pen_x += metrics.advance_width;
                }
            }
            None => {
                let glyph_w = (px * 0.55).max(2.0) as u32;
                let glyph_h = px as u32;
                let advance = glyph_w + (glyph_w / 3).max(1);
                for ch in text.chars() {
                    if pen_x as u32 + glyph_w > max_x {
                        break;
                    }
                    if !ch.is_whitespace() {
                        for row in 0..glyph_h {
                            for col in 0..glyph_w {
                                blend_white(
                                    canvas,
                                    pen_x as i64 + col as i64,
                                    i64::from(baseline) - i64::from(glyph_h)
                                        + row as i64,
                                    200,
                                );
                            }
                        }
                    }
                    pen_x += advance as f32;
                }
            }
        }
    }
}

/// Grayscale copy of a photo, alpha preserved.
pub fn desaturate(source: &RgbaImage) -> RgbaImage {
    let mut out = source.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let luma = (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b))
            .round()
            .clamp(0.0, 255.0) as u8;
        *pixel = Rgba([luma, luma, luma, a]);
    }
    out
}

/// Downscale photos whose longest edge exceeds the upload limit.
pub fn fit_for_upload(source: &RgbaImage) -> Option<RgbaImage> {
    let (width, height) = source.dimensions();
    let longest = width.max(height);
    if longest <= MAX_PHOTO_EDGE {
        return None;
    }
    let scale = MAX_PHOTO_EDGE as f32 / longest as f32;
    let new_w = ((width as f32 * scale).round() as u32).max(1);
    let new_h = ((height as f32 * scale).round() as u32).max(1);
    Some(imageops::resize(source, new_w, new_h, FilterType::Triangle))
}

fn blend_white(canvas: &mut RgbaImage, x: i64, y: i64, alpha: u8) {
    if x < 0 || y < 0 || alpha == 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let t = f32::from(alpha) / 255.0;
    let pixel = canvas.get_pixel_mut(x, y);
    for channel in 0..3 {
        pixel.0[channel] = lerp_u8(pixel.0[channel], 245, t);
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use vernissage_model::ArtworkId;

    fn art(id: &str, title: &str) -> ArtworkRef {
        ArtworkRef::new(ArtworkId::parse(id).unwrap(), title, None, None)
    }

    #[test]
    fn same_artwork_paints_identically() {
        let painter = FallbackPainter::new(64, None);
        let a = painter.paint(&art("17", "Quiet Harbour"));
        let b = painter.paint(&art("17", "Quiet Harbour"));
        assert_eq!(a.as_raw(), b.as_raw());
        assert_eq!(a.dimensions(), (64, 64));
    }

    #[test]
    fn caption_marks_the_texture() {
        let painter = FallbackPainter::new(128, None);
        let titled = painter.paint(&art("5", "MMMM"));
        let blank = painter.paint(&art("5", " "));
        // "Untitled" and "MMMM" produce different glyph runs
        assert_ne!(titled.as_raw(), blank.as_raw());
    }

    #[test]
    fn small_sizes_are_raised_to_the_minimum() {
        let painter = FallbackPainter::new(16, None);
        assert_eq!(painter.size(), MIN_FALLBACK_TEXTURE_SIZE);
        let image = painter.paint(&art("1", "T"));
        assert_eq!(
            image.dimensions(),
            (MIN_FALLBACK_TEXTURE_SIZE, MIN_FALLBACK_TEXTURE_SIZE)
        );
        // Single glyph block at the caption start; the same row further
        // right is plain gradient
        let row = MIN_FALLBACK_TEXTURE_SIZE - BORDER_PX - CAPTION_MARGIN - 1;
        let start = BORDER_PX + CAPTION_MARGIN;
        assert_ne!(
            image.get_pixel(start, row),
            image.get_pixel(start + 12, row),
            "caption is drawn at the minimum size"
        );
    }

    #[test]
    fn zero_size_paints_the_minimum() {
        let image = FallbackPainter::new(0, None).paint(&art("2", "Longer Title"));
        assert_eq!(image.width(), MIN_FALLBACK_TEXTURE_SIZE);
    }

    #[test]
    fn missing_font_falls_back_to_blocks() {
        let painter =
            FallbackPainter::new(64, Some(Path::new("/nonexistent/font.ttf")));
        assert!(!painter.has_font());
    }

    #[test]
    fn desaturate_removes_colour() {
        let photo = RgbaImage::from_pixel(2, 2, Rgba([200, 40, 10, 128]));
        let gray = desaturate(&photo);
        let [r, g, b, a] = gray.get_pixel(0, 0).0;
        assert!(r == g && g == b);
        assert_eq!(a, 128);
    }

    #[test]
    fn large_photos_are_downscaled() {
        assert!(fit_for_upload(&RgbaImage::new(800, 600)).is_none());
        let fitted = fit_for_upload(&RgbaImage::new(4096, 2048)).unwrap();
        assert_eq!(fitted.dimensions(), (1024, 512));
    }
}
