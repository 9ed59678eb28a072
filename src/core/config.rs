//! Configuration system: TOML file + env var overrides + built-in defaults.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WhError};

/// Full wheelhouse configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub organize: OrganizeConfig,
    pub index: IndexConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Artifact mover settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Shell glob matched against file names in the working directory.
    pub archive_pattern: String,
    /// Rewrite the stored file name so alias substitution is reflected in it.
    pub rename_files: bool,
    /// Permission bits for newly created package directories (unix only).
    pub dir_mode: u32,
    /// Filename token -> canonical package name.
    pub aliases: BTreeMap<String, String>,
}

/// Index generator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexConfig {
    /// Attach a SHA-256 digest to every file link.
    pub checksums: bool,
    /// Render `README.md` into the page when present.
    pub readme: bool,
    /// Descend into symlinked directories. No loop protection.
    pub follow_symlinks: bool,
    /// Number of directories rendered concurrently.
    pub parallelism: usize,
    /// Entry names never listed on a page.
    pub skip_names: Vec<String>,
    /// Extension (with leading dot) -> icon identifier.
    pub icons: BTreeMap<String, String>,
    pub directory_icon: String,
    pub default_icon: String,
    pub links: LinksConfig,
}

/// How entry hrefs are generated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    #[default]
    Relative,
    Absolute,
}

/// Link generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinksConfig {
    pub mode: LinkMode,
    /// Scheme and host used by absolute links, e.g. `https://mirror.example.org`.
    pub base_url: String,
    /// Path under which the tree root is served. Also used for page titles.
    pub path_prefix: String,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only JSONL activity log. Disabled when unset.
    pub jsonl_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by wheelhouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        let aliases = [("discord_py", "discord.py"), ("lru_dict", "lru-dict")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            archive_pattern: "*.whl".to_string(),
            rename_files: true,
            dir_mode: 0o755,
            aliases,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        let mut icons = BTreeMap::new();
        icons.insert(".whl".to_string(), "settings_applications".to_string());
        Self {
            checksums: true,
            readme: true,
            follow_symlinks: false,
            parallelism: 1,
            skip_names: vec!["index.html".to_string()],
            icons,
            directory_icon: "folder".to_string(),
            default_icon: "insert_drive_file".to_string(),
            links: LinksConfig::default(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::Relative,
            base_url: String::new(),
            path_prefix: "/pip".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            jsonl_path: None,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[WH-CONFIG] WARNING: HOME not set, falling back to /tmp for config path");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir
                .join(".config")
                .join("wheelhouse")
                .join("config.toml"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| WhError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(WhError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("WHEELHOUSE_ORGANIZE_ARCHIVE_PATTERN") {
            self.organize.archive_pattern = raw;
        }
        if let Some(raw) = lookup("WHEELHOUSE_ORGANIZE_RENAME_FILES") {
            self.organize.rename_files = parse_env_bool("WHEELHOUSE_ORGANIZE_RENAME_FILES", &raw)?;
        }
        if let Some(raw) = lookup("WHEELHOUSE_INDEX_CHECKSUMS") {
            self.index.checksums = parse_env_bool("WHEELHOUSE_INDEX_CHECKSUMS", &raw)?;
        }
        if let Some(raw) = lookup("WHEELHOUSE_INDEX_README") {
            self.index.readme = parse_env_bool("WHEELHOUSE_INDEX_README", &raw)?;
        }
        if let Some(raw) = lookup("WHEELHOUSE_INDEX_FOLLOW_SYMLINKS") {
            self.index.follow_symlinks =
                parse_env_bool("WHEELHOUSE_INDEX_FOLLOW_SYMLINKS", &raw)?;
        }
        if let Some(raw) = lookup("WHEELHOUSE_INDEX_PARALLELISM") {
            self.index.parallelism = parse_env_usize("WHEELHOUSE_INDEX_PARALLELISM", &raw)?;
        }
        if let Some(raw) = lookup("WHEELHOUSE_LOG_JSONL") {
            self.logging.jsonl_path = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// Normalize values for consistent comparison.
    pub fn normalize(&mut self) {
        let icons = std::mem::take(&mut self.index.icons);
        self.index.icons = icons
            .into_iter()
            .map(|(ext, icon)| {
                let key = if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                };
                (key, icon)
            })
            .collect();

        let links = &mut self.index.links;
        while links.base_url.ends_with('/') {
            links.base_url.pop();
        }
        while links.path_prefix.len() > 1 && links.path_prefix.ends_with('/') {
            links.path_prefix.pop();
        }
        if links.path_prefix == "/" {
            links.path_prefix.clear();
        }
    }

    pub fn validate(&self) -> Result<()> {
        crate::organize::pattern::validate_glob_pattern(&self.organize.archive_pattern)?;

        if self.organize.dir_mode > 0o7777 {
            return Err(WhError::InvalidConfig {
                details: format!(
                    "organize.dir_mode must be <= 0o7777, got {:#o}",
                    self.organize.dir_mode
                ),
            });
        }

        for (token, canonical) in &self.organize.aliases {
            for (what, value) in [("key", token), ("value", canonical)] {
                if value.is_empty() || value.contains('/') || value.contains('\\') {
                    return Err(WhError::InvalidConfig {
                        details: format!(
                            "organize.aliases {what} {value:?} must be non-empty and free of path separators"
                        ),
                    });
                }
            }
        }

        if self.index.parallelism == 0 {
            return Err(WhError::InvalidConfig {
                details: "index.parallelism must be >= 1".to_string(),
            });
        }

        let links = &self.index.links;
        if !links.path_prefix.is_empty() && !links.path_prefix.starts_with('/') {
            return Err(WhError::InvalidConfig {
                details: format!(
                    "index.links.path_prefix must start with '/', got {:?}",
                    links.path_prefix
                ),
            });
        }
        if links.mode == LinkMode::Absolute
            && !(links.base_url.starts_with("http://") || links.base_url.starts_with("https://"))
        {
            return Err(WhError::InvalidConfig {
                details: format!(
                    "index.links.base_url must be an http(s) URL when mode = \"absolute\", got {:?}",
                    links.base_url
                ),
            });
        }

        if self.logging.max_size_bytes == 0 {
            return Err(WhError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|error| WhError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| WhError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
