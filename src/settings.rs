use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::schedule::LayoutConfig;

/// Grid settings the user can change; the panel width is measured, not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    pub opening_hour: u32,
    pub pixels_per_hour: f64,
    pub base_column_width: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let config = LayoutConfig::default();
        Self {
            opening_hour: config.opening_hour,
            pixels_per_hour: config.pixels_per_hour,
            base_column_width: config.base_column_width,
        }
    }
}

impl LayoutSettings {
    pub fn to_config(&self, panel_width: f64) -> LayoutConfig {
        LayoutConfig {
            opening_hour: self.opening_hour,
            pixels_per_hour: self.pixels_per_hour,
            base_column_width: self.base_column_width,
            panel_width,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    layout: LayoutSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            load_settings(&path).unwrap_or_else(|err| {
                warn!("Using default settings: {err:#}");
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn layout(&self) -> LayoutSettings {
        self.read().layout.clone()
    }

    pub fn update_layout(&self, settings: LayoutSettings) -> Result<()> {
        let mut guard = self.write();
        guard.layout = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let data = load_settings(&self.path)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_settings(path: &Path) -> Result<UserSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Malformed settings in {}", path.display()))
}
