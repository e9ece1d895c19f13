//! Software text renderer using cosmic-text and tiny-skia
//!
//! Resolves font descriptors against the system font database, measures and
//! shapes text on the CPU, and produces either binary glyph coverage (for
//! visibility masks) or colored pixels blended into a tiny-skia pixmap.

use std::cell::RefCell;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, LayoutGlyph, Metrics, Shaping, SwashCache, SwashContent,
};
use text_display_core::{FALLBACK_FONT, FontProvider, GlyphRasterizer, VisibilityMask};
use text_display_types::{Rgb, TextMetrics, TextOrigin};
use tiny_skia::Pixmap;

use crate::platform::PlatformError;

/// Pixel size used when a descriptor leaves it unspecified (`fixed` is 6x13)
pub const DEFAULT_PIXEL_SIZE: f32 = 13.0;

/// Coverage at or above this counts as ink in a visibility mask
const COVERAGE_THRESHOLD: u8 = 128;

/// A font face request resolved against the font database
#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareFont {
    /// Family name; `None` selects the system monospace family
    pub family: Option<String>,
    pub pixel_size: f32,
}

/// Pull family and pixel size out of a descriptor.
///
/// Structured descriptors keep the family in field 2 and the pixel size in
/// field 7 (`-foundry-family-weight-slant-width-style-pixels-...`). Wildcards,
/// empty fields and the `fixed` alias map to monospace / the default size.
pub fn parse_descriptor(descriptor: &str) -> SoftwareFont {
    let (family, pixels) = if descriptor.starts_with('-') {
        let fields: Vec<&str> = descriptor.split('-').collect();
        (
            fields.get(2).copied().unwrap_or("*"),
            fields.get(7).copied().unwrap_or("*"),
        )
    } else {
        (descriptor, "*")
    };

    let family = match family.trim() {
        "" | "*" => None,
        f if f.eq_ignore_ascii_case(FALLBACK_FONT) => None,
        f => Some(f.to_string()),
    };
    let pixel_size = pixels
        .parse::<f32>()
        .ok()
        .filter(|px| *px > 0.0)
        .unwrap_or(DEFAULT_PIXEL_SIZE);

    SoftwareFont { family, pixel_size }
}

/// A software renderer backed by the system font database
pub struct SoftwareRenderer {
    font_system: RefCell<FontSystem>,
    swash_cache: RefCell<SwashCache>,
}

impl SoftwareRenderer {
    /// Create a new renderer, loading system fonts
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system: RefCell::new(font_system),
            swash_cache: RefCell::new(SwashCache::new()),
        }
    }

    fn has_family(&self, family: &str) -> bool {
        self.font_system
            .borrow()
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name.eq_ignore_ascii_case(family)))
    }

    fn has_any_face(&self) -> bool {
        self.font_system.borrow().db().faces().next().is_some()
    }

    /// Shape a single line of text. Returns the glyphs and their extents.
    fn shape(&self, font: &SoftwareFont, text: &str) -> (Vec<LayoutGlyph>, TextMetrics) {
        let mut font_system = self.font_system.borrow_mut();
        let metrics = Metrics::new(font.pixel_size, font.pixel_size * 1.2);
        let mut text_buffer = Buffer::new(&mut font_system, metrics);

        let attrs = match &font.family {
            Some(name) => Attrs::new().family(Family::Name(name)),
            None => Attrs::new().family(Family::Monospace),
        };
        text_buffer.set_text(&mut font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut font_system, false);

        let Some(run) = text_buffer.layout_runs().next() else {
            return (
                Vec::new(),
                TextMetrics {
                    width: 0,
                    ascent: font.pixel_size.round() as u32,
                    descent: (font.pixel_size * 0.2).round() as u32,
                },
            );
        };

        let metrics = TextMetrics {
            width: run.line_w.ceil().max(0.0) as u32,
            ascent: (run.line_y - run.line_top).round().max(0.0) as u32,
            descent: (run.line_top + run.line_height - run.line_y).round().max(0.0) as u32,
        };
        (run.glyphs.to_vec(), metrics)
    }

    /// Visit every pixel touched by `text` with its coverage (0-255)
    fn for_each_glyph_pixel(
        &self,
        font: &SoftwareFont,
        text: &str,
        origin: TextOrigin,
        mut visit: impl FnMut(i32, i32, u8),
    ) {
        let (glyphs, _) = self.shape(font, text);
        let mut font_system = self.font_system.borrow_mut();
        let mut swash_cache = self.swash_cache.borrow_mut();

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((origin.x as f32, origin.y as f32), 1.0);

            let Some(image) = swash_cache.get_image(&mut font_system, physical_glyph.cache_key)
            else {
                continue;
            };

            let glyph_x = physical_glyph.x + image.placement.left;
            let glyph_y = physical_glyph.y - image.placement.top;
            let glyph_width = image.placement.width as usize;

            for gy in 0..image.placement.height as usize {
                for gx in 0..glyph_width {
                    let i = gy * glyph_width + gx;
                    let coverage = match image.content {
                        SwashContent::Mask => image.data.get(i).copied(),
                        SwashContent::Color => image.data.get(i * 4 + 3).copied(),
                        SwashContent::SubpixelMask => image
                            .data
                            .get(i * 4..i * 4 + 3)
                            .and_then(|rgb| rgb.iter().max().copied()),
                    }
                    .unwrap_or(0);

                    if coverage > 0 {
                        visit(glyph_x + gx as i32, glyph_y + gy as i32, coverage);
                    }
                }
            }
        }
    }

    /// Draw text into a pixmap, alpha blending `color` over what is there
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        font: &SoftwareFont,
        text: &str,
        origin: TextOrigin,
        color: Rgb,
    ) {
        let pixmap_width = pixmap.width() as i32;
        let pixmap_height = pixmap.height() as i32;
        let data = pixmap.data_mut();

        self.for_each_glyph_pixel(font, text, origin, |px, py, alpha| {
            if px < 0 || py < 0 || px >= pixmap_width || py >= pixmap_height {
                return;
            }
            let pixel_idx = ((py * pixmap_width + px) * 4) as usize;
            draw_glyph_pixel(&mut data[pixel_idx..pixel_idx + 4], color, alpha);
        });
    }
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blend one premultiplied RGBA pixel toward an opaque color
fn draw_glyph_pixel(pixel: &mut [u8], color: Rgb, alpha: u8) {
    let src_a = alpha as u32;
    let inv_a = 255 - src_a;

    pixel[0] = ((color.r as u32 * src_a + pixel[0] as u32 * inv_a) / 255) as u8;
    pixel[1] = ((color.g as u32 * src_a + pixel[1] as u32 * inv_a) / 255) as u8;
    pixel[2] = ((color.b as u32 * src_a + pixel[2] as u32 * inv_a) / 255) as u8;
    pixel[3] = (src_a + (pixel[3] as u32 * inv_a) / 255) as u8;
}

impl FontProvider for SoftwareRenderer {
    type Font<'a> = SoftwareFont;
    type Error = PlatformError;

    fn load(&self, descriptor: &str) -> Result<SoftwareFont, PlatformError> {
        let font = parse_descriptor(descriptor);
        let available = match &font.family {
            Some(family) => self.has_family(family),
            None => self.has_any_face(),
        };
        if !available {
            return Err(PlatformError::FontUnavailable(descriptor.to_string()));
        }
        Ok(font)
    }

    fn measure(&self, font: &SoftwareFont, text: &str) -> TextMetrics {
        self.shape(font, text).1
    }
}

impl GlyphRasterizer for SoftwareRenderer {
    fn rasterize(
        &self,
        font: &SoftwareFont,
        text: &str,
        origin: TextOrigin,
        mask: &mut VisibilityMask,
    ) -> Result<(), PlatformError> {
        self.for_each_glyph_pixel(font, text, origin, |x, y, coverage| {
            if coverage >= COVERAGE_THRESHOLD {
                mask.mark(x, y);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic_text::fontdb;

    fn empty_renderer() -> SoftwareRenderer {
        SoftwareRenderer::with_font_system(FontSystem::new_with_locale_and_db(
            "en-US".to_string(),
            fontdb::Database::new(),
        ))
    }

    #[test]
    fn test_parse_synthesized_descriptor() {
        assert_eq!(
            parse_descriptor("-*-Arial-*-*-*-*-12-*-*-*-*-*-*-*"),
            SoftwareFont {
                family: Some("Arial".to_string()),
                pixel_size: 12.0
            }
        );
    }

    #[test]
    fn test_parse_full_descriptor() {
        let font = parse_descriptor("-adobe-helvetica-bold-r-normal--17-120-100-100-p-92-iso8859-1");
        assert_eq!(font.family.as_deref(), Some("helvetica"));
        assert_eq!(font.pixel_size, 17.0);
    }

    #[test]
    fn test_fixed_and_wildcards_map_to_monospace() {
        assert_eq!(
            parse_descriptor("fixed"),
            SoftwareFont {
                family: None,
                pixel_size: DEFAULT_PIXEL_SIZE
            }
        );
        assert_eq!(parse_descriptor("-*-fixed-*-*-*-*-18-*-*-*-*-*-*-*").family, None);
        assert_eq!(parse_descriptor("-*-*-*-*-*-*-*-*").family, None);
        assert_eq!(parse_descriptor("-*-*-*-*-*-*-*-*").pixel_size, DEFAULT_PIXEL_SIZE);
    }

    #[test]
    fn test_empty_database_has_no_fonts() {
        let renderer = empty_renderer();
        assert!(matches!(
            renderer.load("fixed"),
            Err(PlatformError::FontUnavailable(_))
        ));
        assert!(renderer.load("-*-Arial-*-*-*-*-12-*-*-*-*-*-*-*").is_err());
    }

    #[test]
    fn test_blend_opaque_and_partial() {
        let mut pixel = [0, 0, 0, 255];
        draw_glyph_pixel(&mut pixel, Rgb::RED, 255);
        assert_eq!(pixel, [255, 0, 0, 255]);

        let mut pixel = [0, 0, 0, 255];
        draw_glyph_pixel(&mut pixel, Rgb::new(0, 200, 0), 0);
        assert_eq!(pixel, [0, 0, 0, 255]);

        let mut pixel = [0, 0, 0, 255];
        draw_glyph_pixel(&mut pixel, Rgb::new(0, 0, 255), 51);
        assert_eq!(pixel, [0, 0, 51, 255]);
    }
}
