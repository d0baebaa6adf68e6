//! Renderer settings that persist to disk as RON files, with CLI
//! overrides and hot-reload detection.

mod cli;
mod error;
mod settings;

pub use cli::CliArgs;
pub use error::ConfigError;
pub use settings::{
    default_config_dir, DebugSettings, DetailOptions, ObserverSettings, PhotometrySettings,
    Settings,
};
