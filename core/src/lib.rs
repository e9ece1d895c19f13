pub mod error;
pub mod font;
pub mod geometry;
pub mod mask;
pub mod parse;


pub use error::{ConfigError, FontError};
pub use font::{FALLBACK_FONT, FontProvider, ResolvedFont, descriptor_for, resolve_font};
pub use geometry::{compute_geometry, text_origin};
pub use mask::{GlyphRasterizer, Span, VisibilityMask, build_mask};
