pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use invex_core::InvexConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Load the configuration named on the command line, falling back to the
/// default config file and then to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    let default_path = default_config_path();
    Ok(InvexConfig::load_or_default(
        config_path.map(Path::new),
        Some(&default_path),
    )?)
}
