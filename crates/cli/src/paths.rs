//! Config file resolution.

use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "PARKWATCH_CONFIG";
const CONFIG_FILE: &str = "config.toml";

/// Returns the sync config to load when `--config` is not given.
///
/// # Resolution Order
///
/// 1. `PARKWATCH_CONFIG` environment variable.
/// 2. `$XDG_CONFIG_HOME/parkwatch/config.toml`, if the file exists.
///
/// `None` means the built-in defaults apply.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
	if let Ok(path) = std::env::var(CONFIG_ENV) {
		return Some(PathBuf::from(path));
	}
	dirs::config_dir().and_then(|dir| existing_config(&dir))
}

fn existing_config(config_dir: &Path) -> Option<PathBuf> {
	Some(config_dir.join("parkwatch").join(CONFIG_FILE)).filter(|path| path.is_file())
}
