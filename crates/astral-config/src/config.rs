//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level effect engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Starfield generator settings.
    pub starfield: StarfieldConfig,
    /// Aurora particle settings.
    pub aurora: AuroraConfig,
    /// Orbital loader settings.
    pub loader: LoaderConfig,
    /// Moon phase widget settings.
    pub moon: MoonConfig,
    /// Host viewport the effects are laid out against.
    pub viewport: ViewportConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Seed for star placement. Same seed, same sky.
    pub seed: u64,
    /// Number of stars.
    pub count: u32,
    /// Field rotation about Y, radians per second.
    pub rotation_speed_y: f32,
    /// Field rotation about Z, radians per second.
    pub rotation_speed_z: f32,
}

/// Aurora particle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuroraConfig {
    /// Seed for initial placement and respawn sampling.
    pub seed: u64,
    /// Number of particles.
    pub count: u32,
}

/// Orbital loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Interval between progress ticks in milliseconds.
    pub tick_ms: u64,
    /// Progress added per tick, in percent.
    pub step: u32,
    /// Delay between reaching 100% and the completion callback, in milliseconds.
    pub completion_delay_ms: u64,
    /// Skip the animation entirely on narrow viewports.
    pub skip_on_narrow_viewport: bool,
    /// Viewports narrower than this (logical pixels) count as narrow.
    pub narrow_viewport_px: u32,
}

/// Moon phase widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoonConfig {
    /// How often the cached phase is recomputed, in seconds.
    pub refresh_seconds: u64,
}

/// Viewport configuration used by headless hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames the headless demo simulates before exiting.
    pub demo_frames: u32,
    /// Frame duration the headless demo feeds the host, in milliseconds.
    pub demo_frame_ms: u64,
}

// --- Default implementations ---

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            count: 200,
            rotation_speed_y: 0.01,
            rotation_speed_z: 0.005,
        }
    }
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            count: 100,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            tick_ms: 60,
            step: 2,
            completion_delay_ms: 1000,
            skip_on_narrow_viewport: false,
            narrow_viewport_px: 768,
        }
    }
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: 3600,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_frames: 300,
            demo_frame_ms: 16,
        }
    }
}

/// Platform config directory for the effect engine, if one exists.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("astral-effects"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
