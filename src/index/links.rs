//! Href and display-path generation for index pages.
//!
//! Two strategies:
//! - **Relative** (default): entry links are bare names, so pages work at any
//!   deployment path.
//! - **Absolute**: entry links are full URLs anchored at `base_url` plus the
//!   configured path prefix.
//!
//! Both share the page title: `<path_prefix>/<dir relative to root>`.

#![allow(missing_docs)]

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::core::config::{LinkMode, LinksConfig};

const PATH_SEGMENT_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Link generation strategy for one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStrategy {
    Relative { path_prefix: String },
    Absolute { base_url: String, path_prefix: String },
}

impl LinkStrategy {
    pub fn from_config(config: &LinksConfig) -> Self {
        match config.mode {
            LinkMode::Relative => Self::Relative {
                path_prefix: config.path_prefix.clone(),
            },
            LinkMode::Absolute => Self::Absolute {
                base_url: config.base_url.clone(),
                path_prefix: config.path_prefix.clone(),
            },
        }
    }

    fn path_prefix(&self) -> &str {
        match self {
            Self::Relative { path_prefix } | Self::Absolute { path_prefix, .. } => path_prefix,
        }
    }

    /// Human-readable path of a directory, `rel_dir` being slash-separated
    /// and empty for the root.
    pub fn display_path(&self, rel_dir: &str) -> String {
        let prefix = self.path_prefix();
        match (prefix.is_empty(), rel_dir.is_empty()) {
            (true, true) => "/".to_string(),
            (false, true) => prefix.to_string(),
            (_, false) => format!("{prefix}/{rel_dir}"),
        }
    }

    /// Href for an entry named `name` inside `rel_dir`.
    pub fn href(&self, rel_dir: &str, name: &str, is_dir: bool) -> String {
        let trailing = if is_dir { "/" } else { "" };
        match self {
            Self::Relative { .. } => format!("{}{trailing}", encode_segment(name)),
            Self::Absolute {
                base_url,
                path_prefix,
            } => {
                let mut url = format!("{base_url}{}", encode_path(path_prefix));
                if !rel_dir.is_empty() {
                    url.push('/');
                    url.push_str(&encode_path(rel_dir));
                }
                url.push('/');
                url.push_str(&encode_segment(name));
                url.push_str(trailing);
                url
            }
        }
    }

    /// Href of the parent directory page, `None` at the root.
    pub fn parent_href(&self, rel_dir: &str) -> Option<String> {
        if rel_dir.is_empty() {
            return None;
        }
        match self {
            Self::Relative { .. } => Some("../".to_string()),
            Self::Absolute {
                base_url,
                path_prefix,
            } => {
                let parent = rel_dir.rsplit_once('/').map_or("", |(parent, _)| parent);
                let mut url = format!("{base_url}{}", encode_path(path_prefix));
                if !parent.is_empty() {
                    url.push('/');
                    url.push_str(&encode_path(parent));
                }
                url.push('/');
                Some(url)
            }
        }
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_SET).to_string()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
