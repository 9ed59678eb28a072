//! Directory discovery and per-directory listings.

#![allow(missing_docs)]

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::{Result, WhError};

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    /// Listing order: directories first, then by name.
    pub fn listing_order(a: &Self, b: &Self) -> Ordering {
        b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
    }
}

/// The root plus every directory below it, root first, the rest sorted.
///
/// Symlinked directories are included and descended only when
/// `follow_symlinks` is set, and then without loop detection: a link cycle
/// never terminates.
pub fn discover_directories(root: &Path, follow_symlinks: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(WhError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).map_err(|source| WhError::io(&dir, source))? {
            let entry = entry.map_err(|source| WhError::io(&dir, source))?;
            let file_type = entry
                .file_type()
                .map_err(|source| WhError::io(entry.path(), source))?;
            let path = entry.path();
            if is_listed_dir(&path, file_type, follow_symlinks) {
                stack.push(path.clone());
                found.push(path);
            }
        }
    }

    found.sort();
    let mut directories = Vec::with_capacity(found.len() + 1);
    directories.push(root.to_path_buf());
    directories.extend(found);
    Ok(directories)
}

/// Immediate children of `dir` in listing order, minus `skip_names`.
///
/// A symlinked directory counts as a directory only under `follow_symlinks`;
/// otherwise it is listed as a plain entry, matching what
/// [`discover_directories`] walks.
pub fn list_directory(
    dir: &Path,
    skip_names: &HashSet<String>,
    follow_symlinks: bool,
) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| WhError::io(dir, source))? {
        let entry = entry.map_err(|source| WhError::io(dir, source))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if skip_names.contains(&name) {
            continue;
        }
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|source| WhError::io(&path, source))?;
        entries.push(DirEntry {
            is_dir: is_listed_dir(&path, file_type, follow_symlinks),
            name,
            path,
        });
    }
    entries.sort_by(DirEntry::listing_order);
    Ok(entries)
}

fn is_listed_dir(path: &Path, file_type: fs::FileType, follow_symlinks: bool) -> bool {
    if file_type.is_symlink() {
        follow_symlinks && path.is_dir()
    } else {
        file_type.is_dir()
    }
}
