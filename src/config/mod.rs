use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const APP_DIR: &str = "slam-launcher";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ENGINE_COMMAND: &str = "orb_slam_engine";
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";
pub const DEFAULT_STORAGE_ROOT: &str = "/storage/emulated/0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

/// Launcher settings from `config.json`.
///
/// The two model paths are deliberately absent: they start from the
/// built-in defaults and only change through path selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine_command: Option<String>,
    #[serde(default)]
    pub engine_args: Vec<String>,
    #[serde(default)]
    pub camera_device: Option<PathBuf>,
    #[serde(default)]
    pub storage_root: Option<PathBuf>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn engine_command(&self) -> &str {
        self.engine_command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
            .unwrap_or(DEFAULT_ENGINE_COMMAND)
    }

    pub fn camera_device(&self) -> PathBuf {
        self.camera_device
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAMERA_DEVICE))
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(path) => path,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_config_home, home, ".config")?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

/// `$XDG_*_HOME` when set and non-empty, otherwise `$HOME/<fallback>`.
pub(crate) fn xdg_root(
    xdg_home: Option<&Path>,
    home: Option<&Path>,
    home_fallback: &str,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(home_fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::scratch_dir;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            APP_DIR,
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/slam-launcher/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            APP_DIR,
            "config.json",
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/home/.config/slam-launcher/config.json")
        );
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path(APP_DIR, "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let root = scratch_dir("config-missing");
        let config = load_app_config_with(Some(root.as_path()), None);

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine_command(), DEFAULT_ENGINE_COMMAND);
        assert_eq!(config.camera_device(), PathBuf::from(DEFAULT_CAMERA_DEVICE));
        assert_eq!(config.storage_root(), PathBuf::from(DEFAULT_STORAGE_ROOT));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let root = scratch_dir("config-partial");
        std::fs::create_dir_all(root.join(APP_DIR)).unwrap();
        std::fs::write(
            root.join(APP_DIR).join(APP_CONFIG_FILE),
            r#"{ "engine_command": "mono_tum", "engine_args": ["--viewer"] }"#,
        )
        .unwrap();

        let config = load_app_config_with(Some(root.as_path()), None);
        assert_eq!(config.engine_command(), "mono_tum");
        assert_eq!(config.engine_args, vec!["--viewer".to_string()]);
        assert_eq!(config.storage_root(), PathBuf::from(DEFAULT_STORAGE_ROOT));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let root = scratch_dir("config-malformed");
        std::fs::create_dir_all(root.join(APP_DIR)).unwrap();
        std::fs::write(root.join(APP_DIR).join(APP_CONFIG_FILE), "{ not json").unwrap();

        assert_eq!(load_app_config_with(Some(root.as_path()), None), AppConfig::default());
    }
}
