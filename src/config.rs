/// Gallery configuration
///
/// Settings are layered, lowest precedence first:
/// - built-in defaults
/// - the user config (`config.json` in the platform config directory)
/// - an explicit `--config` file
/// - the folder manifest (`gallery.json` inside the gallery folder)
/// - command line flags
///
/// Every layer is a partial JSON object; missing fields fall through.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::pagination::DEFAULT_MAX_BUTTONS;

/// Slots per page
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Cards per row
pub const DEFAULT_COLUMNS: u32 = 3;

/// Extension candidates, in probing priority
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "webp"];

/// Name of the per-folder manifest
pub const MANIFEST_FILE: &str = "gallery.json";

/// Complete settings for one gallery session
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Base path that candidate URLs are built under
    pub folder: String,
    /// Total number of slots across all pages
    pub total: u32,
    pub page_size: u32,
    /// Tried in order for every slot
    pub extensions: Vec<String>,
    pub max_buttons: u32,
    pub columns: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            total: 0,
            page_size: DEFAULT_PAGE_SIZE,
            extensions: DEFAULT_EXTENSIONS.map(String::from).to_vec(),
            max_buttons: DEFAULT_MAX_BUTTONS,
            columns: DEFAULT_COLUMNS,
        }
    }
}

/// One partial layer of settings
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    pub folder: Option<String>,
    pub total: Option<u32>,
    pub page_size: Option<u32>,
    pub extensions: Option<Vec<String>>,
    pub max_buttons: Option<u32>,
    pub columns: Option<u32>,
}

impl ConfigLayer {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a layer from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a layer from `path` if the file exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}

impl GalleryConfig {
    /// Overlay every field that `layer` sets
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(folder) = &layer.folder {
            self.folder = folder.clone();
        }
        if let Some(total) = layer.total {
            self.total = total;
        }
        if let Some(page_size) = layer.page_size {
            self.page_size = page_size;
        }
        if let Some(extensions) = &layer.extensions {
            self.extensions = extensions.clone();
        }
        if let Some(max_buttons) = layer.max_buttons {
            self.max_buttons = max_buttons;
        }
        if let Some(columns) = layer.columns {
            self.columns = columns;
        }
    }

    /// Build the session config for `folder`.
    ///
    /// `base` holds the defaults plus user/explicit config files; the folder
    /// manifest and then `flags` are applied on top.
    pub fn for_folder(base: &GalleryConfig, folder: &Path, flags: &ConfigLayer) -> Result<Self, ConfigError> {
        let mut config = base.clone();
        config.folder = folder.to_string_lossy().to_string();

        let manifest = folder.join(MANIFEST_FILE);
        if let Some(layer) = ConfigLayer::load_optional(&manifest)? {
            tracing::debug!(path = %manifest.display(), "applying folder manifest");
            config.apply(&layer);
            // A manifest describes its own folder
            config.folder = folder.to_string_lossy().to_string();
        }

        config.apply(&ConfigLayer {
            folder: None,
            ..flags.clone()
        });
        config.validate()?;
        Ok(config)
    }

    /// Check invariants and normalize the extension list
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.folder.trim().is_empty() {
            return Err(ConfigError::MissingFolder);
        }
        if self.total == 0 {
            return Err(ConfigError::ZeroTotal);
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.max_buttons == 0 {
            return Err(ConfigError::ZeroMaxButtons);
        }
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }

        let mut extensions: Vec<String> = Vec::with_capacity(self.extensions.len());
        for raw in &self.extensions {
            let ext = raw.trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                continue;
            }
            if ImageFormat::from_extension(&ext).is_none() {
                return Err(ConfigError::UnsupportedExtension(raw.clone()));
            }
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        self.extensions = extensions;

        Ok(())
    }
}

/// Location of the user config file
/// Returns ~/.config/slot-gallery/config.json on Linux
pub fn user_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("slot-gallery");
    path.push("config.json");
    Some(path)
}

/// Defaults overlaid with the user config and an explicit config file
pub fn load_base(explicit: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let mut config = GalleryConfig::default();

    if let Some(path) = user_config_path() {
        if let Some(layer) = ConfigLayer::load_optional(&path)? {
            tracing::debug!(path = %path.display(), "applying user config");
            config.apply(&layer);
        }
    }

    if let Some(path) = explicit {
        config.apply(&ConfigLayer::load(path)?);
    }

    Ok(config)
}
