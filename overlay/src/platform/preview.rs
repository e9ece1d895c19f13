//! Headless preview backend
//!
//! Runs the same overlay pipeline without a display server: the "window" is
//! an in-memory pixmap that is written out as a PNG when flushed. Pixels
//! outside the visibility mask come out fully transparent.

use std::path::{Path, PathBuf};

use text_display_core::{FontProvider, GlyphRasterizer, VisibilityMask};
use text_display_types::{Rgb, ScreenMetrics, TextMetrics, TextOrigin, WindowGeometry};
use tiny_skia::{Color, Pixmap};

use super::{OverlayPlatform, OverlaySurface, PlatformError};
use crate::renderer::{SoftwareFont, SoftwareRenderer};

/// Software platform that renders the overlay to a PNG file
pub struct PreviewPlatform {
    renderer: SoftwareRenderer,
    screen: ScreenMetrics,
    output: PathBuf,
}

impl PreviewPlatform {
    pub fn new(renderer: SoftwareRenderer, screen: ScreenMetrics, output: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            screen,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl FontProvider for PreviewPlatform {
    type Font<'a> = SoftwareFont;
    type Error = PlatformError;

    fn load(&self, descriptor: &str) -> Result<SoftwareFont, PlatformError> {
        self.renderer.load(descriptor)
    }

    fn measure(&self, font: &SoftwareFont, text: &str) -> TextMetrics {
        self.renderer.measure(font, text)
    }
}

impl GlyphRasterizer for PreviewPlatform {
    fn rasterize(
        &self,
        font: &SoftwareFont,
        text: &str,
        origin: TextOrigin,
        mask: &mut VisibilityMask,
    ) -> Result<(), PlatformError> {
        self.renderer.rasterize(font, text, origin, mask)
    }
}

impl OverlayPlatform for PreviewPlatform {
    type Surface<'a> = PreviewSurface<'a>;

    fn screen_metrics(&self) -> ScreenMetrics {
        self.screen
    }

    fn create_surface<'a>(
        &'a self,
        geometry: &WindowGeometry,
        font: &SoftwareFont,
        color: Rgb,
    ) -> Result<PreviewSurface<'a>, PlatformError> {
        let mut pixmap = Pixmap::new(geometry.width.max(1), geometry.height.max(1)).ok_or_else(|| {
            PlatformError::BufferError(format!(
                "cannot allocate {}x{} pixmap",
                geometry.width, geometry.height
            ))
        })?;
        // Same black background the X11 window gets
        pixmap.fill(Color::BLACK);

        Ok(PreviewSurface {
            platform: self,
            pixmap,
            font: font.clone(),
            color,
            mask: None,
        })
    }
}

/// In-memory overlay window
pub struct PreviewSurface<'a> {
    platform: &'a PreviewPlatform,
    pixmap: Pixmap,
    font: SoftwareFont,
    color: Rgb,
    mask: Option<VisibilityMask>,
}

impl PreviewSurface<'_> {
    /// Window contents with the mask applied
    pub fn composite(&self) -> Pixmap {
        let mut out = self.pixmap.clone();
        if let Some(mask) = &self.mask {
            let width = out.width() as usize;
            for (i, pixel) in out.data_mut().chunks_exact_mut(4).enumerate() {
                if !mask.is_visible((i % width) as i32, (i / width) as i32) {
                    pixel.fill(0);
                }
            }
        }
        out
    }
}

impl OverlaySurface for PreviewSurface<'_> {
    fn apply_mask(&mut self, mask: &VisibilityMask) -> Result<(), PlatformError> {
        self.mask = Some(mask.clone());
        Ok(())
    }

    fn map(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: TextOrigin) -> Result<(), PlatformError> {
        self.platform
            .renderer
            .draw_text(&mut self.pixmap, &self.font, text, origin, self.color);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PlatformError> {
        let path = self.platform.output();
        self.composite().save_png(path).map_err(|e| {
            PlatformError::BufferError(format!("failed to write {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "wrote preview");
        Ok(())
    }
}
