//! Standard locations for configuration files

use std::path::PathBuf;

/// Returns `~/.config/posdecode` (or the platform equivalent)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("posdecode")
}

/// Returns `<config dir>/{filename}`
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}
