//! Font resolution with a single fallback attempt
//!
//! A font identifier is either a bare family name (`Arial`) or a full
//! descriptor (`-misc-fixed-medium-r-normal--13-120-75-75-c-70-iso8859-1`).
//! Bare names are widened into a wildcard descriptor carrying the size hint.
//! When the provider cannot load the result, [`FALLBACK_FONT`] is tried once
//! before giving up.

use std::borrow::Cow;

use text_display_types::TextMetrics;

use crate::error::FontError;

/// Font name every X server is required to provide
pub const FALLBACK_FONT: &str = "fixed";

/// Backend capable of loading fonts and measuring text with them.
pub trait FontProvider {
    /// Loaded font. Dropping it releases any backend resources.
    type Font<'a>
    where
        Self: 'a;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a font by exact descriptor. No fallback happens here.
    fn load(&self, descriptor: &str) -> Result<Self::Font<'_>, Self::Error>;

    /// Measure `text` in `font`. Must not touch any shared state.
    fn measure(&self, font: &Self::Font<'_>, text: &str) -> TextMetrics;
}

/// A font that loaded successfully, along with how it was found
#[derive(Debug)]
pub struct ResolvedFont<F> {
    pub font: F,
    /// Descriptor that actually loaded
    pub descriptor: String,
    /// True when the requested font failed and [`FALLBACK_FONT`] was used
    pub fell_back: bool,
}

/// Structured descriptors carry dash-separated fields; bare names do not.
pub fn is_descriptor(identifier: &str) -> bool {
    identifier.contains('-')
}

/// Descriptor to try first for `identifier`
pub fn descriptor_for(identifier: &str, size_hint: u32) -> Cow<'_, str> {
    if is_descriptor(identifier) {
        Cow::Borrowed(identifier)
    } else {
        Cow::Owned(format!(
            "-*-{identifier}-*-*-*-*-{size_hint}-*-*-*-*-*-*-*"
        ))
    }
}

/// Load the requested font, falling back to [`FALLBACK_FONT`] once.
pub fn resolve_font<'p, P: FontProvider>(
    provider: &'p P,
    identifier: &str,
    size_hint: u32,
) -> Result<ResolvedFont<P::Font<'p>>, FontError> {
    let descriptor = descriptor_for(identifier, size_hint);
    tracing::debug!(%descriptor, "loading font");

    match provider.load(&descriptor) {
        Ok(font) => {
            return Ok(ResolvedFont {
                font,
                descriptor: descriptor.into_owned(),
                fell_back: false,
            });
        }
        Err(e) => {
            tracing::warn!(%descriptor, error = %e, "could not load font, trying {FALLBACK_FONT}");
        }
    }

    match provider.load(FALLBACK_FONT) {
        Ok(font) => Ok(ResolvedFont {
            font,
            descriptor: FALLBACK_FONT.to_string(),
            fell_back: true,
        }),
        Err(e) => Err(FontError::Unresolvable {
            requested: descriptor.into_owned(),
            fallback: FALLBACK_FONT,
            source: Box::new(e),
        }),
    }
}
