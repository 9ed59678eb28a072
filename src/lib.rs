#![forbid(unsafe_code)]

//! wheelhouse: tools for a static package mirror.
//!
//! Two independent passes over a local directory tree:
//! 1. **Artifact mover** ([`organize`]): moves archive files into
//!    per-package directories, mapping irregular package names through an
//!    alias table.
//! 2. **Index generator** ([`index`]): writes an `index.html` into every
//!    directory with sorted links, optional SHA-256 checksums, filetype icons
//!    and the rendered `README.md`.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use wheelhouse::prelude::*;
//!
//! # fn main() -> wheelhouse::core::errors::Result<()> {
//! let config = Config::load(None)?;
//! let root = std::path::PathBuf::from("/srv/pip");
//!
//! let mut mover = ArtifactMover::new(MoverConfig::from_config(&config.organize, root.clone())?);
//! mover.run()?;
//!
//! IndexGenerator::new(IndexSettings::from_config(&config.index, root)).run()?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod index;
pub mod logger;
pub mod organize;
