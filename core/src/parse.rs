//! Parsing of command-line values
//!
//! Every function here is strict except [`parse_placement`] and
//! [`parse_transparency`], which keep the historical lenient behavior and
//! only log when they see something unexpected.

use text_display_types::{Placement, Rgb, ScreenMetrics};

use crate::error::ConfigError;

/// Parse `RRGGBB` (a leading `#` is tolerated)
pub fn parse_color(value: &str) -> Result<Rgb, ConfigError> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor {
            value: value.to_string(),
        });
    }

    u32::from_str_radix(digits, 16)
        .map(Rgb::from_u32)
        .map_err(|_| ConfigError::InvalidColor {
            value: value.to_string(),
        })
}

/// Parse a non-negative pixel or second count
pub fn parse_count<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    value: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber {
            value: value.to_string(),
            source,
        })
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_screen_size(value: &str) -> Result<ScreenMetrics, ConfigError> {
    let invalid = || ConfigError::InvalidScreenSize {
        value: value.to_string(),
    };

    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok(ScreenMetrics { width, height })
}

/// Map a placement name, sending unknown names to the screen origin
pub fn parse_placement(value: &str) -> Placement {
    Placement::from_name(value).unwrap_or_else(|| {
        tracing::warn!(
            position = value,
            "unrecognized position, placing window at the screen origin"
        );
        Placement::Unanchored
    })
}

/// `true`, `1` and `yes` enable transparency; anything else disables it
pub fn parse_transparency(value: &str) -> bool {
    match value {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        other => {
            tracing::warn!(value = other, "unrecognized transparency flag, treating as false");
            false
        }
    }
}

/// Reject empty text
pub fn parse_text(value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(ConfigError::EmptyText)
    } else {
        Ok(value.to_string())
    }
}
