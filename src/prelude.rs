//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use wheelhouse::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, WhError};

// Organize
pub use crate::organize::alias::{AliasTable, package_token};
pub use crate::organize::mover::{
    ArtifactMover, MoveEvent, MovePlan, MoveReport, MoverConfig, SkippedFile,
};
pub use crate::organize::pattern::ArchivePattern;

// Index
pub use crate::index::generator::{GeneratedPage, IndexGenerator, IndexReport, IndexSettings};
pub use crate::index::links::LinkStrategy;
pub use crate::index::markdown::{CommonMarkRenderer, MarkdownRenderer};
pub use crate::index::page::{HtmlPageRenderer, PageContext, PageRenderer};

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLog};
