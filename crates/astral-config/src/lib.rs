//! Configuration for the Astral Explorers effect engine.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section is `#[serde(default)]`, so old or partial
//! files keep loading as new fields are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AuroraConfig, Config, DebugConfig, LoaderConfig, MoonConfig, StarfieldConfig, ViewportConfig,
    default_config_dir,
};
pub use error::ConfigError;
