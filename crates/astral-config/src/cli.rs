//! Command-line argument parsing for the effect engine.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Astral effects command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "astral-demo", about = "Astral Explorers effect engine")]
pub struct CliArgs {
    /// Starfield seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of stars.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Number of aurora particles.
    #[arg(long)]
    pub particles: Option<u32>,

    /// Viewport width in logical pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Skip the loader animation on narrow viewports.
    #[arg(long)]
    pub skip_narrow: Option<bool>,

    /// Frames to simulate before exiting.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.starfield.seed = seed;
        }
        if let Some(count) = args.stars {
            self.starfield.count = count;
        }
        if let Some(count) = args.particles {
            self.aurora.count = count;
        }
        if let Some(w) = args.width {
            self.viewport.width = w;
        }
        if let Some(skip) = args.skip_narrow {
            self.loader.skip_on_narrow_viewport = skip;
        }
        if let Some(frames) = args.frames {
            self.debug.demo_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            stars: Some(500),
            width: Some(375),
            skip_narrow: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.starfield.count, 500);
        assert_eq!(config.viewport.width, 375);
        assert!(config.loader.skip_on_narrow_viewport);
        // Non-overridden fields retain defaults
        assert_eq!(config.aurora.count, 100);
        assert_eq!(config.viewport.height, 720);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["astral-demo", "--seed", "9", "--frames", "10"]);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.frames, Some(10));
        assert!(args.config.is_none());
    }
}
