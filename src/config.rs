// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Missing file or missing keys fall back to defaults. `Config::load` also
// falls back on parse errors; `Config::load_from_path` reports them.

use crate::backend::{PresentationMode, RendererSettings};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
    pub paths: PathsConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan1Drv".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct GraphicsConfig {
    /// "immediate", "vsync", "relaxed_vsync" or "triple_buffering"
    pub presentation_mode: PresentationMode,
    /// Device extensions an adapter must expose besides the built-in ones
    pub device_extensions: Vec<String>,
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    /// Filter passed to env_logger when RUST_LOG is unset
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: cfg!(debug_assertions),
            log_level: "info".to_string(),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the compiled shaders
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Settings handed to `RenderDevice::init`
    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            app_name: self.window.title.clone(),
            presentation_mode: self.graphics.presentation_mode,
            data_dir: self.paths.data_dir.clone(),
            enable_validation: self.debug.validation_layers,
            extra_device_extensions: self.graphics.device_extensions.clone(),
        }
    }
}
