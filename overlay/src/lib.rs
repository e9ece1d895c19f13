//! Text Display Overlay Library
//!
//! Display backends for the text overlay.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    platform/                        │
//! │     OverlayPlatform, OverlaySurface (traits)         │
//! │   x11: core fonts, 1-bit readback, SHAPE masks       │
//! │   preview: headless, writes a PNG                    │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                          │
//! │            cosmic-text + tiny-skia                   │
//! │     (font lookup, shaping, glyph coverage)           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod platform;
pub mod renderer;

// Re-export commonly used types
#[cfg(all(unix, not(target_os = "macos")))]
pub use platform::NativeOverlay;
pub use platform::preview::{PreviewPlatform, PreviewSurface};
pub use platform::{OverlayPlatform, OverlaySurface, PlatformError};
pub use renderer::{SoftwareFont, SoftwareRenderer};
