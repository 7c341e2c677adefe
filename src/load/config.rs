//! Display preferences read from `milelog.toml`

use std::path::{Path, PathBuf};

use crate::error::{MilelogError, Result};
use crate::lib::units::Preferences;

/// Looked up in the working directory when no file is given explicitly
pub const LOCAL_CONFIG_NAME: &str = "milelog.toml";

pub fn parse_preferences(path: &Path, contents: &str) -> Result<Preferences> {
    toml::from_str(contents).map_err(|source| MilelogError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the preferences
///
/// An explicit `path` must exist. Otherwise the local configuration is used
/// if there is one, and the defaults if not.
pub fn load_preferences(path: Option<&Path>) -> Result<Preferences> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG_NAME);
            if !local.exists() {
                log::debug!("no {} found, using default preferences", LOCAL_CONFIG_NAME);
                return Ok(Preferences::default());
            }
            local
        }
    };
    let contents = std::fs::read_to_string(&path).map_err(|source| MilelogError::FileRead {
        path: path.clone(),
        source,
    })?;
    let prefs = parse_preferences(&path, &contents)?;
    log::debug!("preferences loaded from {}", path.display());
    Ok(prefs)
}
