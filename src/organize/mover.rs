//! Artifact mover: relocate archive files into per-package directories.
//!
//! A single pass over the working directory: every file whose name matches the
//! archive pattern is moved to `<workdir>/<package>/<file>`, creating the
//! package directory when needed. Files with no usable package directory (a
//! non-UTF-8 name, or a name made only of dots) are skipped with a note. Any
//! filesystem error aborts the pass; files already moved stay where they are
//! and remain recorded in the report given to [`ArtifactMover::run_into`].

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::OrganizeConfig;
use crate::core::errors::{Result, WhError};
use crate::organize::alias::AliasTable;
use crate::organize::pattern::ArchivePattern;

/// Mover configuration derived from `OrganizeConfig`.
#[derive(Debug, Clone)]
pub struct MoverConfig {
    pub workdir: PathBuf,
    pub pattern: ArchivePattern,
    pub aliases: AliasTable,
    pub rename_files: bool,
    pub dir_mode: u32,
    pub dry_run: bool,
}

impl MoverConfig {
    pub fn from_config(config: &OrganizeConfig, workdir: PathBuf) -> Result<Self> {
        Ok(Self {
            workdir,
            pattern: ArchivePattern::new(&config.archive_pattern)?,
            aliases: AliasTable::new(config.aliases.clone()),
            rename_files: config.rename_files,
            dir_mode: config.dir_mode,
            dry_run: false,
        })
    }
}

/// Where one archive file is going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovePlan {
    pub source: PathBuf,
    pub package: String,
    pub destination_dir: PathBuf,
    pub destination: PathBuf,
}

/// Progress notifications emitted while the mover runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEvent<'a> {
    Found { package: &'a str },
    CreatingDirectory { path: &'a Path },
    Moving { destination: &'a Path },
    Skipped { file: &'a Path, reason: &'a str },
    NoFiles,
}

impl fmt::Display for MoveEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { package } => write!(f, "Found {package}, preparing to move."),
            Self::CreatingDirectory { path } => write!(
                f,
                "No directory for {} found, creating it now.",
                path.display()
            ),
            Self::Moving { destination } => {
                write!(f, "Moving file to {}", destination.display())
            }
            Self::Skipped { file, reason } => {
                write!(f, "Skipping {}: {reason}", file.display())
            }
            Self::NoFiles => f.write_str("No files found to work on."),
        }
    }
}

/// A matching file the mover left in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one mover pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub moved: Vec<MovePlan>,
    pub created_dirs: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub dry_run: bool,
}

impl MoveReport {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.skipped.is_empty()
    }
}

const NOT_UTF8: &str = "file name is not valid UTF-8";
const NO_PACKAGE: &str = "no package directory can be derived from the file name";

type ProgressFn<'a> = Box<dyn FnMut(&MoveEvent<'_>) + 'a>;

/// Moves matching archive files into per-package directories.
pub struct ArtifactMover<'a> {
    config: MoverConfig,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> ArtifactMover<'a> {
    pub fn new(config: MoverConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Set a callback invoked for every progress event.
    #[must_use]
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&MoveEvent<'_>) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &MoverConfig {
        &self.config
    }

    /// Archive files directly inside the working directory, sorted by name.
    ///
    /// Names that are not valid UTF-8 are matched lossily and still returned,
    /// so [`run`](Self::run) can report them instead of ignoring them.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let workdir = &self.config.workdir;
        if !workdir.is_dir() {
            return Err(WhError::NotADirectory {
                path: workdir.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(workdir).map_err(|source| WhError::io(workdir, source))? {
            let entry = entry.map_err(|source| WhError::io(workdir, source))?;
            let path = entry.path();
            let name = entry.file_name();
            if self.config.pattern.matches(&name.to_string_lossy()) && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Compute the destination for one archive file without touching disk.
    pub fn plan(&self, source: &Path) -> Result<MovePlan> {
        self.try_plan(source).map_err(|reason| {
            WhError::io(source, std::io::Error::new(ErrorKind::InvalidInput, reason))
        })
    }

    fn try_plan(&self, source: &Path) -> std::result::Result<MovePlan, &'static str> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(NOT_UTF8)?;
        let package = self.package_for(file_name).ok_or(NO_PACKAGE)?;

        let destination_dir = self.config.workdir.join(package);
        let stored_name = if self.config.rename_files {
            self.config.aliases.resolve_filename(file_name)
        } else {
            file_name.to_string()
        };
        let destination = destination_dir.join(stored_name);

        Ok(MovePlan {
            source: source.to_path_buf(),
            package: package.to_string(),
            destination_dir,
            destination,
        })
    }

    /// Package directory name for `file_name`, never the file name itself.
    ///
    /// Without a hyphen the leading dots and the extension are dropped
    /// (`standalone.whl` -> `standalone`, `.whl` -> `whl`).
    fn package_for<'n>(&'n self, file_name: &'n str) -> Option<&'n str> {
        let package = self.config.aliases.package_name(file_name);
        if package != file_name {
            return (!package.is_empty()).then_some(package);
        }
        let bare = file_name.trim_start_matches('.');
        let stem = Path::new(bare)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(bare);
        (!stem.is_empty() && stem != file_name).then_some(stem)
    }

    /// Run one full pass: scan, then plan and move every match in name order.
    pub fn run(&mut self) -> Result<MoveReport> {
        let mut report = MoveReport::default();
        self.run_into(&mut report)?;
        Ok(report)
    }

    /// Like [`run`](Self::run), but records into `report` as it goes so the
    /// caller still sees every completed move when a later one fails.
    pub fn run_into(&mut self, report: &mut MoveReport) -> Result<()> {
        report.dry_run = self.config.dry_run;
        let files = self.scan()?;

        if files.is_empty() {
            self.emit(&MoveEvent::NoFiles);
            return Ok(());
        }

        for file in files {
            let plan = match self.try_plan(&file) {
                Ok(plan) => plan,
                Err(reason) => {
                    self.emit(&MoveEvent::Skipped {
                        file: &file,
                        reason,
                    });
                    report.skipped.push(SkippedFile {
                        path: file,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };
            self.emit(&MoveEvent::Found {
                package: &plan.package,
            });

            if !plan.destination_dir.exists() {
                self.emit(&MoveEvent::CreatingDirectory {
                    path: &plan.destination_dir,
                });
                if self.config.dry_run
                    || ensure_dir(&plan.destination_dir, self.config.dir_mode)?
                {
                    report.created_dirs.push(plan.destination_dir.clone());
                }
            } else if !plan.destination_dir.is_dir() {
                return Err(WhError::NotADirectory {
                    path: plan.destination_dir,
                });
            }

            self.emit(&MoveEvent::Moving {
                destination: &plan.destination,
            });
            if !self.config.dry_run {
                fs::rename(&plan.source, &plan.destination)
                    .map_err(|source| WhError::io(&plan.source, source))?;
            }
            report.moved.push(plan);
        }

        Ok(())
    }

    fn emit(&mut self, event: &MoveEvent<'_>) {
        if let Some(progress) = self.progress.as_mut() {
            progress(event);
        }
    }
}

/// Create a single directory level with `mode`, tolerating an existing directory.
///
/// Returns `true` when the directory was created by this call.
fn ensure_dir(path: &Path, mode: u32) -> Result<bool> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    match builder.create(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(false)
            } else {
                Err(WhError::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(source) => Err(WhError::io(path, source)),
    }
}
