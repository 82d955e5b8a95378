use derive_more::{AsRef, Deref, Display, From};
use directories::ProjectDirs;
use peacock::MenuStyle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ITEM_SIZE: i32 = 48;
pub const DEFAULT_FRAME_MS: u64 = 16;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ButtonConfig {
    pub label: Label,
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            label: Label::new("menu"),
            x: 460,
            y: 860,
            size: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: Label,
    #[serde(default = "default_item_size")]
    pub size: i32,
    /// Overrides of the ring this item opens as a submenu.
    pub start_angle: Option<f64>,
    pub end_angle: Option<f64>,
    pub radius: Option<i32>,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

fn default_item_size() -> i32 {
    DEFAULT_ITEM_SIZE
}

fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub button: ButtonConfig,
    #[serde(default)]
    pub style: MenuStyle,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
    /// Simulated time between two timeline steps.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            button: ButtonConfig::default(),
            style: MenuStyle::default(),
            items: Vec::new(),
            frame_ms: DEFAULT_FRAME_MS,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No home directory to keep peacock's config in")]
    NoConfigDir,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to write config: {0}")]
    Io(#[from] std::io::Error),
}

/// `config.toml` inside the platform config dir, e.g. `~/.config/peacock`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("org", "xfdsj", "peacock")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Builtin defaults, then the config file, then `PEACOCK_*` variables
/// (`PEACOCK_STYLE__MOTION__DURATION_MS=900`). An explicit `path` must exist.
pub fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path, true),
        None => (default_config_path()?, false),
    };

    let s = config::Config::builder()
        .add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ))
        .add_source(config::File::from(path).required(required))
        .add_source(
            config::Environment::with_prefix("PEACOCK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Seeds the config dir with the builtin config. An existing file is left alone.
pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = default_config_path()?;
    if path.exists() {
        log::info!("{} already exists", path.display());
        return Ok(path);
    }
    if let Some(dir) = path.parent() {
        fs_err::create_dir_all(dir)?;
    }
    fs_err::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use peacock::Easing;

    #[test]
    fn test_builtin_config_parses() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.button.label, Label::new("menu"));
        assert_eq!(config.style.motion.open_easing, Easing::Overshoot);
        assert_eq!(config.items.len(), 3);
        let share = &config.items[1];
        assert_eq!(share.radius, Some(120));
        assert_eq!(share.items.len(), 2);
        assert_eq!(share.items[0].size, DEFAULT_ITEM_SIZE);
    }

    #[test]
    fn test_item_tree_deserialization() {
        let json = r#"{
            "items": [
                { "label": "a", "size": 40, "items": [ { "label": "a0" } ] },
                { "label": "b", "start_angle": 0, "end_angle": 90 }
            ],
            "style": { "motion": { "open_easing": "ease-out" } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.frame_ms, DEFAULT_FRAME_MS);
        assert_eq!(config.button.size, 80);
        assert_eq!(config.items[0].items[0].label.as_str(), "a0");
        assert_eq!(config.items[1].end_angle, Some(90.0));
        assert_eq!(config.style.motion.open_easing, Easing::Decelerate);
        assert_eq!(config.style.motion.lag_ms, 20);
    }

    #[test]
    fn test_explicit_file_layers_over_builtin() {
        let path = std::env::temp_dir().join(format!("peacock-{}.toml", std::process::id()));
        fs_err::write(&path, "frame_ms = 33\n[[items]]\nlabel = \"only\"\n").unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        fs_err::remove_file(&path).unwrap();

        assert_eq!(config.frame_ms, 33);
        assert_eq!(config.button.label, Label::new("menu"));
        assert_eq!(config.items.len(), 1);
        assert!(matches!(
            load_config(Some(path)),
            Err(ConfigError::Config(_))
        ));
    }
}
