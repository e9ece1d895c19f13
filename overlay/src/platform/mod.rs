//! Platform abstraction for overlay windows
//!
//! This module defines the traits that all platform backends must implement,
//! so the controller can drive a real display server or the headless preview
//! the same way.

use text_display_core::{GlyphRasterizer, VisibilityMask};
use text_display_types::{Rgb, ScreenMetrics, TextOrigin, WindowGeometry};

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

pub mod preview;

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// The backend has no font matching the descriptor
    FontUnavailable(String),
    /// Pixel buffer allocation, readback or encoding failed
    BufferError(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::FontUnavailable(s) => write!(f, "Font unavailable: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// A display backend: fonts, glyph coverage and window creation.
pub trait OverlayPlatform: GlyphRasterizer<Error = PlatformError> {
    /// Window handle. Dropping it destroys the window.
    type Surface<'a>: OverlaySurface
    where
        Self: 'a;

    /// Size of the screen the overlay is placed on
    fn screen_metrics(&self) -> ScreenMetrics;

    /// Create an unmapped, undecorated, always-on-top window whose drawing
    /// context paints `color` using `font`.
    fn create_surface<'a>(
        &'a self,
        geometry: &WindowGeometry,
        font: &Self::Font<'_>,
        color: Rgb,
    ) -> Result<Self::Surface<'a>, PlatformError>;
}

/// Operations on a created overlay window
pub trait OverlaySurface {
    /// Restrict the visible region of the window to the mask's visible pixels
    fn apply_mask(&mut self, mask: &VisibilityMask) -> Result<(), PlatformError>;

    /// Make the window visible
    fn map(&mut self) -> Result<(), PlatformError>;

    /// Draw text with its baseline starting at `origin`
    fn draw_text(&mut self, text: &str, origin: TextOrigin) -> Result<(), PlatformError>;

    /// Push all pending output to the screen
    fn flush(&mut self) -> Result<(), PlatformError>;
}

/// Re-export the native backend for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Display as NativeOverlay;
