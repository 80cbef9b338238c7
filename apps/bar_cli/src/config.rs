use std::{fs, path::Path};

use anyhow::Context;
use composite_bar::BarOptions;
use serde::Deserialize;
use shared::domain::{CompositeDescriptor, Orientation};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "compositebar.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompositeSettings {
    pub id: String,
    pub name: String,
    pub order: i32,
    /// Rendered extent of the entry along the bar.
    #[serde(default = "default_entry_size")]
    pub size: u32,
}

impl CompositeSettings {
    pub fn descriptor(&self) -> CompositeDescriptor {
        CompositeDescriptor::new(self.id.as_str(), self.name.clone(), self.order)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bar: BarOptions,
    pub default_composite: String,
    pub composites: Vec<CompositeSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        let composites = [
            ("workbench.view.explorer", "Explorer", 0),
            ("workbench.view.search", "Search", 1),
            ("workbench.view.scm", "Source Control", 2),
            ("workbench.view.debug", "Run and Debug", 3),
            ("workbench.view.extensions", "Extensions", 4),
        ]
        .into_iter()
        .map(|(id, name, order)| CompositeSettings {
            id: id.into(),
            name: name.into(),
            order,
            size: default_entry_size(),
        })
        .collect();

        Self {
            database_url: "sqlite://./data/compositebar.db".into(),
            bar: BarOptions::default(),
            default_composite: "workbench.view.explorer".into(),
            composites,
        }
    }
}

/// Shape of `compositebar.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    database_url: Option<String>,
    storage_key: Option<String>,
    orientation: Option<Orientation>,
    overflow_action_size: Option<u32>,
    icon: Option<bool>,
    default_composite: Option<String>,
    #[serde(default)]
    composites: Vec<CompositeSettings>,
}

fn default_entry_size() -> u32 {
    48
}

pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        // Only a file named on the command line has to exist.
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.storage_key {
        settings.bar.storage_key = v;
    }
    if let Some(v) = file_cfg.orientation {
        settings.bar.orientation = v;
    }
    if let Some(v) = file_cfg.overflow_action_size {
        settings.bar.overflow_action_size = v;
    }
    if let Some(v) = file_cfg.icon {
        settings.bar.icon = v;
    }
    if let Some(v) = file_cfg.default_composite {
        settings.default_composite = v;
    }
    if !file_cfg.composites.is_empty() {
        settings.composites = file_cfg.composites;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("COMPOSITEBAR_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__STORAGE_KEY") {
        settings.bar.storage_key = v;
    }

    if let Some(v) = var("APP__ORIENTATION") {
        match v.trim().to_ascii_lowercase().as_str() {
            "horizontal" => settings.bar.orientation = Orientation::Horizontal,
            "vertical" => settings.bar.orientation = Orientation::Vertical,
            other => warn!(value = other, "ignoring unknown APP__ORIENTATION"),
        }
    }

    if let Some(v) = var("APP__OVERFLOW_ACTION_SIZE") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.bar.overflow_action_size = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__OVERFLOW_ACTION_SIZE"),
        }
    }
}

/// Turns a bare path or `sqlite:` path into a `sqlite://` url. The store
/// creates missing parent directories when it opens the file.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
