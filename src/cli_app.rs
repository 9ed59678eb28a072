//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use wheelhouse::core::config::{Config, LinkMode};
use wheelhouse::core::errors::WhError;
use wheelhouse::core::paths::resolve_absolute_path;
use wheelhouse::index::generator::{GeneratedPage, IndexGenerator, IndexReport, IndexSettings};
use wheelhouse::logger::activity::{ActivityEvent, ActivityLog};
use wheelhouse::organize::mover::{ArtifactMover, MoveEvent, MoveReport, MoverConfig};

/// wheelhouse: organize a static package mirror and generate its index pages.
#[derive(Debug, Parser)]
#[command(
    name = "wheelhouse",
    author,
    version,
    about = "Organize package archives and generate static directory indexes",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Move archive files into per-package directories.
    Organize(OrganizeArgs),
    /// Write an index.html into every directory of a tree.
    Index(IndexArgs),
    /// Inspect and validate configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct OrganizeArgs {
    /// Directory holding the archive files (defaults to the current directory).
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Report what would move without touching the filesystem.
    #[arg(long)]
    dry_run: bool,
    /// Keep original file names instead of applying package aliases.
    #[arg(long)]
    keep_names: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct IndexArgs {
    /// Root of the tree to index (defaults to the current directory).
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,
    /// Skip SHA-256 checksums.
    #[arg(long)]
    no_checksums: bool,
    /// Skip README.md rendering.
    #[arg(long)]
    no_readme: bool,
    /// Descend into symlinked directories.
    #[arg(long)]
    follow_symlinks: bool,
    /// Number of directories rendered concurrently.
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,
    /// Emit absolute links anchored at this URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Path shown in page titles and used in absolute links.
    #[arg(long, value_name = "PREFIX")]
    path_prefix: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<WhError> for CliError {
    fn from(err: WhError) -> Self {
        match err {
            WhError::Serialization { .. } => Self::Internal(err.to_string()),
            _ if err.is_user_error() => Self::User(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Organize(args) => run_organize(cli, args),
        Command::Index(args) => run_index(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// organize
// ---------------------------------------------------------------------------

fn run_organize(cli: &Cli, args: &OrganizeArgs) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if args.keep_names {
        config.organize.rename_files = false;
    }
    let workdir = target_dir(args.dir.as_deref())?;
    let mode = output_mode(cli);
    let activity = ActivityLog::open(&config.logging);
    let started = Instant::now();

    activity.log(&ActivityEvent::RunStarted {
        command: "organize".to_string(),
        root: workdir.to_string_lossy().into_owned(),
        config_hash: config.stable_hash()?,
    });

    let mut mover_config = MoverConfig::from_config(&config.organize, workdir.clone())?;
    mover_config.dry_run = args.dry_run;
    let print_progress = mode == OutputMode::Human && !cli.quiet;
    let mut mover = ArtifactMover::new(mover_config).with_progress(|event: &MoveEvent<'_>| {
        if print_progress {
            println!("{event}");
        }
    });

    let mut report = MoveReport::default();
    let outcome = mover.run_into(&mut report);
    if !report.dry_run {
        log_move_report(&activity, &report);
    }
    if let Err(err) = outcome {
        return Err(log_failure(&activity, "organize", err));
    }

    activity.log(&ActivityEvent::RunCompleted {
        command: "organize".to_string(),
        count: report.moved.len(),
        duration_ms: elapsed_ms(started),
    });
    activity.flush();

    match mode {
        OutputMode::Human => {
            if !cli.quiet && !report.is_empty() {
                println!("{}", organize_summary(&report));
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "organize",
                "workdir": workdir.to_string_lossy(),
                "dry_run": report.dry_run,
                "moved": report.moved,
                "created_dirs": report.created_dirs,
                "skipped": report.skipped,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn organize_summary(report: &MoveReport) -> String {
    let verb = if report.dry_run { "Would move" } else { "Moved" };
    let mut summary = format!(
        "{} {} file(s), {} new package director{}.",
        verb.green().bold(),
        report.moved.len(),
        report.created_dirs.len(),
        if report.created_dirs.len() == 1 { "y" } else { "ies" },
    );
    if !report.skipped.is_empty() {
        summary.push_str(&format!(
            " {} {} file(s).",
            "Skipped".yellow().bold(),
            report.skipped.len()
        ));
    }
    summary
}

/// Record what a pass actually did, including a pass that failed partway.
fn log_move_report(activity: &ActivityLog, report: &MoveReport) {
    for dir in &report.created_dirs {
        activity.log(&ActivityEvent::DirectoryCreated {
            path: dir.to_string_lossy().into_owned(),
        });
    }
    for plan in &report.moved {
        activity.log(&ActivityEvent::ArtifactMoved {
            source: plan.source.to_string_lossy().into_owned(),
            destination: plan.destination.to_string_lossy().into_owned(),
            package: plan.package.clone(),
        });
    }
    for skipped in &report.skipped {
        activity.log(&ActivityEvent::ArtifactSkipped {
            source: skipped.path.to_string_lossy().into_owned(),
            reason: skipped.reason.clone(),
        });
    }
}

// ---------------------------------------------------------------------------
// index
// ---------------------------------------------------------------------------

fn run_index(cli: &Cli, args: &IndexArgs) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    apply_index_args(&mut config, args)?;
    let root = target_dir(args.root.as_deref())?;
    let mode = output_mode(cli);
    let activity = ActivityLog::open(&config.logging);
    let started = Instant::now();

    activity.log(&ActivityEvent::RunStarted {
        command: "index".to_string(),
        root: root.to_string_lossy().into_owned(),
        config_hash: config.stable_hash()?,
    });

    let print_progress = mode == OutputMode::Human && !cli.quiet;
    let settings = IndexSettings::from_config(&config.index, root.clone());
    let generator = IndexGenerator::new(settings).with_progress(|page: &GeneratedPage| {
        if print_progress {
            println!("{page}");
        }
        activity.log(&ActivityEvent::IndexWritten {
            path: page.index_path.to_string_lossy().into_owned(),
            entries: page.entries,
        });
    });

    let report = match generator.run() {
        Ok(report) => report,
        Err(err) => return Err(log_failure(&activity, "index", err)),
    };

    activity.log(&ActivityEvent::RunCompleted {
        command: "index".to_string(),
        count: report.pages.len(),
        duration_ms: elapsed_ms(started),
    });
    activity.flush();

    match mode {
        OutputMode::Human => {
            if !cli.quiet {
                println!("{}", index_summary(&report));
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "index",
                "root": root.to_string_lossy(),
                "pages": report.pages,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn apply_index_args(config: &mut Config, args: &IndexArgs) -> Result<(), CliError> {
    let index = &mut config.index;
    if args.no_checksums {
        index.checksums = false;
    }
    if args.no_readme {
        index.readme = false;
    }
    if args.follow_symlinks {
        index.follow_symlinks = true;
    }
    if let Some(jobs) = args.jobs {
        index.parallelism = jobs;
    }
    if let Some(base_url) = &args.base_url {
        index.links.mode = LinkMode::Absolute;
        index.links.base_url.clone_from(base_url);
    }
    if let Some(prefix) = &args.path_prefix {
        index.links.path_prefix.clone_from(prefix);
    }
    config.normalize();
    config.validate()?;
    Ok(())
}

fn index_summary(report: &IndexReport) -> String {
    let readmes = report.pages.iter().filter(|page| page.readme).count();
    format!(
        "{} {} index page(s), {} with README.",
        "Wrote".green().bold(),
        report.pages.len(),
        readmes,
    )
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => println!("{}", config.to_toml()?),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red().bold());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn target_dir(arg: Option<&Path>) -> Result<PathBuf, CliError> {
    let dir = match arg {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| CliError::Runtime(format!("cannot determine current directory: {e}")))?,
    };
    Ok(resolve_absolute_path(&dir))
}

fn log_failure(activity: &ActivityLog, command: &str, err: WhError) -> CliError {
    activity.log(&ActivityEvent::Error {
        command: command.to_string(),
        code: err.code().to_string(),
        message: err.to_string(),
    });
    activity.flush();
    CliError::from(err)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("WHEELHOUSE_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}
