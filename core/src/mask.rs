//! Glyph-shaped visibility masks
//!
//! The mask starts fully invisible; a [`GlyphRasterizer`] then marks every
//! pixel its glyphs cover. Coverage is binary: a pixel is either part of the
//! text or it is not.

use text_display_types::{TextOrigin, WindowGeometry};

use crate::font::FontProvider;

/// One bit of visibility per window pixel, stored row-major
#[derive(Clone, PartialEq, Eq)]
pub struct VisibilityMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

/// Horizontal run of visible pixels within one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: u32,
    pub y: u32,
    pub len: u32,
}

impl VisibilityMask {
    /// Fully invisible mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Whether the pixel is visible. Out-of-bounds pixels never are.
    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.bits[i])
    }

    /// Mark a pixel visible. Coordinates outside the mask are clipped.
    pub fn mark(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.bits[i] = true;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Maximal runs of visible pixels, top to bottom, left to right
    pub fn spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        if self.width == 0 {
            return spans;
        }

        for (y, row) in self.bits.chunks(self.width as usize).enumerate() {
            let mut start = None;
            for (x, &visible) in row.iter().enumerate() {
                match (visible, start) {
                    (true, None) => start = Some(x),
                    (false, Some(s)) => {
                        spans.push(Span {
                            x: s as u32,
                            y: y as u32,
                            len: (x - s) as u32,
                        });
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                spans.push(Span {
                    x: s as u32,
                    y: y as u32,
                    len: (row.len() - s) as u32,
                });
            }
        }
        spans
    }
}

impl std::fmt::Debug for VisibilityMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "VisibilityMask {}x{}", self.width, self.height)?;
        if self.width == 0 {
            return Ok(());
        }
        for row in self.bits.chunks(self.width as usize) {
            let line: String = row.iter().map(|&b| if b { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Backend that can draw text as monochrome coverage
pub trait GlyphRasterizer: FontProvider {
    /// Mark every pixel covered by `text` drawn with its baseline starting at
    /// `origin`. Must not unmark anything.
    fn rasterize(
        &self,
        font: &Self::Font<'_>,
        text: &str,
        origin: TextOrigin,
        mask: &mut VisibilityMask,
    ) -> Result<(), Self::Error>;
}

/// Build the window's visibility mask from the rendered glyphs.
pub fn build_mask<R: GlyphRasterizer>(
    rasterizer: &R,
    geometry: &WindowGeometry,
    text: &str,
    font: &R::Font<'_>,
    origin: TextOrigin,
) -> Result<VisibilityMask, R::Error> {
    let mut mask = VisibilityMask::new(geometry.width, geometry.height);
    rasterizer.rasterize(font, text, origin, &mut mask)?;

    assert_eq!(
        (mask.width(), mask.height()),
        (geometry.width, geometry.height),
        "visibility mask must match the window size"
    );
    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        visible = mask.visible_count(),
        "built visibility mask"
    );
    Ok(mask)
}
