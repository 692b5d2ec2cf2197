// Backdrop - Live Wallpaper Embedding Behind the Desktop Icons
// Copyright (C) 2026  Backdrop contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration for the embedding host.
//!
//! Loaded from `<config dir>/backdrop/config.toml`; a default file is written
//! on first run. Every section falls back to its defaults when omitted.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::os::{ICON_VIEW_CLASS, SHELL_HOST_CLASS, WORKER_CLASS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbedConfig,
    pub shell: ShellConfig,
    pub target: TargetConfig,
    pub schedule: ScheduleConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Logical screen to cover. Out-of-range values fall back to screen 0.
    pub screen_index: i32,
    /// Fullscreen while embedded. Currently has no effect.
    pub background_fullscreen: bool,
    /// Fullscreen after returning to the foreground.
    pub foreground_fullscreen: bool,
    /// Spawn-and-resolve rounds per embed before deferring to the next tick.
    pub worker_attempts: u32,
    pub shell_timeout_ms: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            screen_index: 0,
            background_fullscreen: false,
            foreground_fullscreen: false,
            worker_attempts: 2,
            shell_timeout_ms: 1000,
        }
    }
}

impl EmbedConfig {
    pub fn shell_timeout(&self) -> Duration {
        Duration::from_millis(self.shell_timeout_ms)
    }
}

/// Class names of the shell windows involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub host_class: String,
    pub icon_view_class: String,
    pub worker_class: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host_class: SHELL_HOST_CLASS.to_string(),
            icon_view_class: ICON_VIEW_CLASS.to_string(),
            worker_class: WORKER_CLASS.to_string(),
        }
    }
}

/// Window to embed. Without class and title the active window is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub class: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enter_after_ms: Option<u64>,
    pub exit_after_ms: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { enter_after_ms: Some(5000), exit_after_ms: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub tick_ms: u32,
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { tick_ms: 100, log_level: "info".to_string(), log_file: None }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Loads `path`, or writes and returns the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            if let Err(e) = Self::default().save(path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Wrote config file {:?}", path);
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("backdrop").join("config.toml"))
    }
}
