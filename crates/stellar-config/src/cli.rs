//! Command-line overrides for persisted settings.

use std::path::PathBuf;

use clap::Parser;

use crate::Settings;

/// Stellar renderer command-line arguments.
///
/// CLI values override settings loaded from `settings.ron`.
#[derive(Parser, Debug)]
#[command(name = "stellar", about = "Stellar scene renderer")]
pub struct CliArgs {
    /// Vertical field of view in degrees.
    #[arg(long)]
    pub fov: Option<f64>,

    /// Disable field-of-view-dependent magnitude limits.
    #[arg(long)]
    pub no_auto_mag: bool,

    /// Faintest star magnitude.
    #[arg(long)]
    pub faintest_mag: Option<f64>,

    /// Ambient light level (0.0 - 1.0).
    #[arg(long)]
    pub ambient: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to settings directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Settings {
    /// Apply CLI overrides to loaded settings.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(fov) = args.fov {
            self.observer.fov_deg = fov;
        }
        if args.no_auto_mag {
            self.photometry.auto_mag = false;
        }
        if let Some(mag) = args.faintest_mag {
            self.photometry.faintest_mag = mag;
        }
        if let Some(ambient) = args.ambient {
            self.photometry.ambient = ambient;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
