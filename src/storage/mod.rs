use std::path::{Path, PathBuf};

use crate::config::{xdg_root, AppConfig, APP_DIR};
use crate::journal::LOG_FILE_NAME;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("external storage not available at {root}")]
    Unavailable { root: PathBuf },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Which configured path a selection result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTarget {
    Calibration,
    Vocabulary,
}

/// Answer of the file-selection collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSelection {
    Cancelled,
    Selected(String),
}

/// The removable/external volume the model files are chosen from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalStorage {
    root: PathBuf,
}

impl ExternalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_dir()
    }

    pub fn ensure_available(&self) -> StorageResult<&Path> {
        if self.is_mounted() {
            Ok(&self.root)
        } else {
            Err(StorageError::Unavailable {
                root: self.root.clone(),
            })
        }
    }
}

/// App-private directory that holds the session log.
pub fn app_data_dir(config: &AppConfig) -> StorageResult<PathBuf> {
    let xdg_data_home = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    app_data_dir_with(config, xdg_data_home.as_deref(), home.as_deref())
}

fn app_data_dir_with(
    config: &AppConfig,
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> StorageResult<PathBuf> {
    if let Some(dir) = config.data_dir.clone() {
        return Ok(dir);
    }
    let mut dir = xdg_root(xdg_data_home, home, ".local/share")
        .map_err(|_| StorageError::MissingHomeDirectory)?;
    dir.push(APP_DIR);
    Ok(dir)
}

pub fn session_log_path(config: &AppConfig) -> StorageResult<PathBuf> {
    Ok(app_data_dir(config)?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::scratch_dir;

    #[test]
    fn data_dir_prefers_explicit_config() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/srv/slam")),
            ..AppConfig::default()
        };
        let dir = app_data_dir_with(&config, Some(Path::new("/tmp/data")), None).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/slam"));
    }

    #[test]
    fn data_dir_uses_xdg_then_home() {
        let config = AppConfig::default();
        assert_eq!(
            app_data_dir_with(&config, Some(Path::new("/tmp/data")), None).unwrap(),
            PathBuf::from("/tmp/data/slam-launcher")
        );
        assert_eq!(
            app_data_dir_with(&config, None, Some(Path::new("/tmp/home"))).unwrap(),
            PathBuf::from("/tmp/home/.local/share/slam-launcher")
        );
        assert_eq!(
            app_data_dir_with(&config, None, None),
            Err(StorageError::MissingHomeDirectory)
        );
    }

    #[test]
    fn storage_is_available_only_when_root_is_a_directory() {
        let root = scratch_dir("storage-root");
        let mounted = ExternalStorage::new(root.clone());
        assert!(mounted.is_mounted());
        assert_eq!(mounted.ensure_available(), Ok(root.as_path()));

        let missing = root.join("unmounted");
        let unmounted = ExternalStorage::new(missing.clone());
        assert_eq!(
            unmounted.ensure_available(),
            Err(StorageError::Unavailable { root: missing })
        );
    }
}
