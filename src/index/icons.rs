//! Filetype icon lookup exposed to page templates.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::core::config::IndexConfig;

/// Extension (with leading dot) to icon identifier, plus fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconTable {
    pub by_extension: BTreeMap<String, String>,
    pub directory: String,
    pub default: String,
}

impl IconTable {
    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            by_extension: config.icons.clone(),
            directory: config.directory_icon.clone(),
            default: config.default_icon.clone(),
        }
    }

    /// Icon for an entry. Extension lookup is case-sensitive.
    pub fn icon_for(&self, name: &str, is_dir: bool) -> &str {
        if is_dir {
            return &self.directory;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(&format!(".{ext}")))
            .map_or(&self.default, |icon| icon)
    }
}

impl Default for IconTable {
    fn default() -> Self {
        Self::from_config(&IndexConfig::default())
    }
}
