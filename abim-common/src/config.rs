//! Configuration loading and data folder resolution.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable naming the data folder.
pub const DATA_DIR_ENV: &str = "ABIM_DATA_DIR";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `ABIM_DATA_DIR` environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return PathBuf::from(data_dir);
                }
            }
        }
    }

    default_data_dir()
}

/// Database file inside the data folder.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("abim.db")
}

/// Create the data folder if it does not exist yet.
pub fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    Ok(())
}

/// Find the configuration file for the platform.
///
/// On Linux the user config (`~/.config/abim/config.toml`) wins over the
/// system one (`/etc/abim/config.toml`); elsewhere only the user config
/// directory is consulted.
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("abim").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/abim/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data folder.
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("abim"))
        .unwrap_or_else(|| PathBuf::from("./abim_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/abim-test")));
        assert_eq!(dir, PathBuf::from("/tmp/abim-test"));
    }

    #[test]
    fn database_path_is_inside_data_dir() {
        let path = database_path(Path::new("/srv/abim"));
        assert_eq!(path, PathBuf::from("/srv/abim/abim.db"));
    }
}
