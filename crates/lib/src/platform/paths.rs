use std::path::{Path, PathBuf};

use crate::consts::APP_NAME;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE").map(PathBuf::from).unwrap_or_default()
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_default()
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
    .join(APP_NAME)
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
  let config_home = std::env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".config"));
  config_home.join(APP_NAME)
}

/// Default location of the settings file.
pub fn config_file() -> PathBuf {
  config_dir().join("config.json")
}

/// Expand a leading `~` and resolve relative paths against `base`.
///
/// The result is not required to exist; prefixes are created on demand.
pub fn expand_path(path_str: &str, base: &Path) -> PathBuf {
  if let Some(rest) = path_str.strip_prefix("~/") {
    home_dir().join(rest)
  } else if path_str == "~" {
    home_dir()
  } else {
    let path = Path::new(path_str);
    if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
  }
}
