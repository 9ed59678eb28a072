//! Index generator: one `index.html` per directory of a tree.
//!
//! Directories are discovered up front, then each page is built from a
//! snapshot of its own directory only. Pages never depend on each other, so
//! with `parallelism > 1` they are rendered by a small worker pool; the first
//! failure stops the pool and is returned.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel as channel;
use parking_lot::Mutex;
use serde::Serialize;

use crate::core::config::IndexConfig;
use crate::core::errors::{Result, WhError};
use crate::core::paths::relative_posix;
use crate::index::checksum::sha256_file;
use crate::index::icons::IconTable;
use crate::index::links::LinkStrategy;
use crate::index::listing::{discover_directories, list_directory};
use crate::index::markdown::{CommonMarkRenderer, MarkdownRenderer, render_readme};
use crate::index::page::{EntryView, HtmlPageRenderer, PageContext, PageRenderer};

/// Name of the generated page in every directory.
pub const INDEX_FILENAME: &str = "index.html";

/// Generator settings derived from `IndexConfig`.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub root: PathBuf,
    pub checksums: bool,
    pub readme: bool,
    pub follow_symlinks: bool,
    pub parallelism: usize,
    pub skip_names: HashSet<String>,
    pub icons: IconTable,
    pub links: LinkStrategy,
}

impl IndexSettings {
    pub fn from_config(config: &IndexConfig, root: PathBuf) -> Self {
        Self {
            root,
            checksums: config.checksums,
            readme: config.readme,
            follow_symlinks: config.follow_symlinks,
            parallelism: config.parallelism,
            skip_names: config.skip_names.iter().cloned().collect(),
            icons: IconTable::from_config(config),
            links: LinkStrategy::from_config(&config.links),
        }
    }
}

/// Result of writing one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPage {
    pub directory: PathBuf,
    pub index_path: PathBuf,
    pub display_path: String,
    pub entries: usize,
    pub checksums: usize,
    pub readme: bool,
}

impl fmt::Display for GeneratedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generated {}", self.index_path.display())
    }
}

/// Summary of one generator pass, pages ordered by directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub pages: Vec<GeneratedPage>,
}

type ProgressFn<'a> = Box<dyn Fn(&GeneratedPage) + Send + Sync + 'a>;

/// Writes directory index pages for a whole tree.
pub struct IndexGenerator<'a> {
    settings: IndexSettings,
    pages: Box<dyn PageRenderer + 'a>,
    markdown: Box<dyn MarkdownRenderer + 'a>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> IndexGenerator<'a> {
    /// Generator using the built-in HTML and CommonMark renderers.
    pub fn new(settings: IndexSettings) -> Self {
        Self {
            settings,
            pages: Box::new(HtmlPageRenderer),
            markdown: Box::new(CommonMarkRenderer),
            progress: None,
        }
    }

    #[must_use]
    pub fn with_page_renderer<R: PageRenderer + 'a>(mut self, renderer: R) -> Self {
        self.pages = Box::new(renderer);
        self
    }

    #[must_use]
    pub fn with_markdown_renderer<R: MarkdownRenderer + 'a>(mut self, renderer: R) -> Self {
        self.markdown = Box::new(renderer);
        self
    }

    /// Set a callback invoked after each page is written.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&GeneratedPage) + Send + Sync + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    /// Build the template input for one directory without writing anything.
    pub fn build_page(&self, dir: &Path) -> Result<PageContext> {
        let settings = &self.settings;
        let rel_dir = relative_posix(&settings.root, dir);
        let listing = list_directory(dir, &settings.skip_names, settings.follow_symlinks)?;

        let mut checksums = BTreeMap::new();
        let mut entries = Vec::with_capacity(listing.len());
        for entry in listing {
            let mut href = settings.links.href(&rel_dir, &entry.name, entry.is_dir);
            if settings.checksums && entry.path.is_file() {
                let digest = sha256_file(&entry.path)?;
                href.push_str("#sha256=");
                href.push_str(&digest);
                checksums.insert(entry.name.clone(), digest);
            }
            entries.push(EntryView {
                name: entry.name,
                href,
                is_dir: entry.is_dir,
            });
        }

        let readme_html = if settings.readme {
            render_readme(dir, self.markdown.as_ref())?
        } else {
            None
        };

        Ok(PageContext {
            display_path: settings.links.display_path(&rel_dir),
            parent_href: settings.links.parent_href(&rel_dir),
            entries,
            icons: settings.icons.clone(),
            checksums,
            readme_html,
        })
    }

    /// Build, render and write the page for one directory.
    pub fn generate_page(&self, dir: &Path) -> Result<GeneratedPage> {
        let page = self.build_page(dir)?;
        let index_path = dir.join(INDEX_FILENAME);
        let html = self.pages.render(&page).map_err(|err| match err {
            WhError::Render { .. } => err,
            other => WhError::Render {
                path: index_path.clone(),
                details: other.to_string(),
            },
        })?;
        fs::write(&index_path, html).map_err(|source| WhError::io(&index_path, source))?;

        Ok(GeneratedPage {
            directory: dir.to_path_buf(),
            index_path,
            display_path: page.display_path,
            entries: page.entries.len(),
            checksums: page.checksums.len(),
            readme: page.readme_html.is_some(),
        })
    }

    /// Discover every directory under the root and write its page.
    pub fn run(&self) -> Result<IndexReport> {
        let directories =
            discover_directories(&self.settings.root, self.settings.follow_symlinks)?;

        let mut pages = if self.settings.parallelism <= 1 || directories.len() <= 1 {
            let mut pages = Vec::with_capacity(directories.len());
            for dir in &directories {
                let page = self.generate_page(dir)?;
                self.emit(&page);
                pages.push(page);
            }
            pages
        } else {
            self.run_parallel(directories)?
        };

        pages.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(IndexReport { pages })
    }

    fn run_parallel(&self, directories: Vec<PathBuf>) -> Result<Vec<GeneratedPage>> {
        let workers = self.settings.parallelism.min(directories.len());
        let (work_tx, work_rx) = channel::unbounded::<PathBuf>();
        for dir in directories {
            work_tx.send(dir).map_err(|err| WhError::Worker {
                details: format!("work queue closed: {err}"),
            })?;
        }
        drop(work_tx);

        let (result_tx, result_rx) = channel::unbounded::<GeneratedPage>();
        let failed = AtomicBool::new(false);
        let first_error: Mutex<Option<WhError>> = Mutex::new(None);
        let mut pages = Vec::new();

        thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let failed = &failed;
                let first_error = &first_error;
                scope.spawn(move || {
                    for dir in &work_rx {
                        if failed.load(Ordering::Acquire) {
                            break;
                        }
                        match self.generate_page(&dir) {
                            Ok(page) => {
                                if result_tx.send(page).is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                failed.store(true, Ordering::Release);
                                let mut slot = first_error.lock();
                                if slot.is_none() {
                                    *slot = Some(err);
                                }
                                break;
                            }
                        }
                    }
                });
            }
            // Only workers hold senders now; the loop ends when they all finish.
            drop(result_tx);

            for page in &result_rx {
                self.emit(&page);
                pages.push(page);
            }
        });

        match first_error.into_inner() {
            Some(err) => Err(err),
            None => Ok(pages),
        }
    }

    fn emit(&self, page: &GeneratedPage) {
        if let Some(progress) = self.progress.as_ref() {
            progress(page);
        }
    }
}
