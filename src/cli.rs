//! Command-line interface

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use text_display_core::ConfigError;
use text_display_core::parse::{
    parse_color, parse_count, parse_placement, parse_screen_size, parse_text, parse_transparency,
};
use text_display_types::{DisplayConfig, Rgb, ScreenMetrics};

#[derive(Parser, Debug)]
#[command(
    name = "text-display",
    version,
    about = "Show a line of text as a borderless, always-on-top overlay"
)]
pub struct Cli {
    /// Text to display
    #[arg(long, default_value = "abc")]
    pub text: String,

    /// Position on screen (top-right, top-left, bottom-right, bottom-left, center)
    #[arg(long, value_name = "POSITION", default_value = "top-right")]
    pub position: String,

    /// X11 font name or full font descriptor
    #[arg(long, default_value = "fixed")]
    pub font: String,

    /// Pixel size used when FONT is a plain name
    #[arg(long, value_name = "PIXELS", default_value_t = 12, value_parser = parse_count::<u32>)]
    pub size: u32,

    /// X margin in pixels
    #[arg(long = "marginx", value_name = "PIXELS", default_value_t = 10, value_parser = parse_count::<u32>)]
    pub margin_x: u32,

    /// Y margin in pixels
    #[arg(long = "marginy", value_name = "PIXELS", default_value_t = 20, value_parser = parse_count::<u32>)]
    pub margin_y: u32,

    /// Text color in hex RGB
    #[arg(long, value_name = "RRGGBB", default_value = "FF0000", value_parser = parse_color)]
    pub color: Rgb,

    /// Display time in seconds
    #[arg(long = "time", value_name = "SECONDS", default_value_t = 30, value_parser = parse_count::<u64>)]
    pub time: u64,

    /// Clip the window to the glyphs (true/1/yes, anything else is false)
    #[arg(long, value_name = "BOOL", default_value = "true")]
    pub transparent: String,

    /// Render to a PNG file instead of opening a window
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Screen size assumed by --preview
    #[arg(long, value_name = "WxH", default_value = "1920x1080", value_parser = parse_screen_size)]
    pub screen: ScreenMetrics,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build the display configuration. Lenient fields log their fallbacks,
    /// so call this after logging is up.
    pub fn to_config(&self) -> Result<DisplayConfig, ConfigError> {
        Ok(DisplayConfig {
            text: parse_text(&self.text)?,
            placement: parse_placement(&self.position),
            font: self.font.clone(),
            font_size: self.size,
            margin_x: self.margin_x,
            margin_y: self.margin_y,
            color: self.color,
            duration_secs: self.time,
            transparent: parse_transparency(&self.transparent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use text_display_types::Placement;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("text-display").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.to_config().unwrap(), DisplayConfig::default());
        assert_eq!(cli.preview, None);
        assert_eq!(
            cli.screen,
            ScreenMetrics {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--text", "hello", "--position", "center", "--font", "Arial", "--size", "18",
            "--marginx", "4", "--marginy", "6", "--color", "00FF00", "--time", "5",
            "--transparent", "no", "-vv",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();

        assert_eq!(config.text, "hello");
        assert_eq!(config.placement, Placement::Center);
        assert_eq!(config.font, "Arial");
        assert_eq!(config.font_size, 18);
        assert_eq!((config.margin_x, config.margin_y), (4, 6));
        assert_eq!(config.color, Rgb::new(0, 255, 0));
        assert_eq!(config.duration_secs, 5);
        assert!(!config.transparent);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_position_is_not_an_error() {
        let config = parse(&["--position", "diagonal"]).unwrap().to_config().unwrap();
        assert_eq!(config.placement, Placement::Unanchored);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        for args in [
            ["--marginx", "ten"],
            ["--marginy", "1.5"],
            ["--time", "soon"],
            ["--color", "red"],
            ["--color", "GG0000"],
            ["--screen", "big"],
        ] {
            let err = parse(&args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{args:?}");
        }
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let cli = parse(&["--text", ""]).unwrap();
        assert!(matches!(cli.to_config(), Err(ConfigError::EmptyText)));
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}
