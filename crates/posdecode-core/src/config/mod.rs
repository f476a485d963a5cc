//! Configuration for the decoded position viewer
//!
//! - Generic YAML config loading/saving
//! - Standard config file locations
//! - The [`PlotConfig`] consumed by the rendering pipeline and playback
//!
//! # Usage
//!
//! ```ignore
//! use posdecode_core::config::{default_config_path, load_config, save_config, PlotConfig};
//!
//! let path = default_config_path("config.yaml");
//! let config: PlotConfig = load_config(&path);
//! save_config(&config, &path)?;
//! ```

mod io;
mod paths;
mod plot;

pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
pub use plot::{ColorConfig, PlaybackConfig, PlotConfig, RenderingConfig};
