#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

const INHERITED_VARS: &[&str] = &[
    "WHEELHOUSE_OUTPUT_FORMAT",
    "WHEELHOUSE_ORGANIZE_ARCHIVE_PATTERN",
    "WHEELHOUSE_ORGANIZE_RENAME_FILES",
    "WHEELHOUSE_INDEX_CHECKSUMS",
    "WHEELHOUSE_INDEX_README",
    "WHEELHOUSE_INDEX_FOLLOW_SYMLINKS",
    "WHEELHOUSE_INDEX_PARALLELISM",
    "WHEELHOUSE_LOG_JSONL",
];

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_wheelhouse") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "wheelhouse.exe"
    } else {
        "wheelhouse"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve wheelhouse binary path for integration test"),
    }
}

/// Run the binary with `args`, no working-directory or env customization.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_in(case_name, None, args, &[])
}

/// Run the binary from `cwd` with extra environment variables.
///
/// `HOME` points at an empty scratch directory so a developer's own config
/// file never leaks into a test, and inherited `WHEELHOUSE_*` variables are
/// cleared.
pub fn run_cli_case_in(
    case_name: &str,
    cwd: Option<&Path>,
    args: &[&str],
    env: &[(&str, &str)],
) -> CmdResult {
    let root = std::env::temp_dir().join("wheelhouse-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let stamp = format!("{}-{}", sanitize(case_name), now_millis());
    let log_path = root.join(format!("{stamp}.log"));
    let home = root.join(format!("{stamp}-home"));
    fs::create_dir_all(&home).expect("create scratch home");
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", &home)
        .env("RUST_BACKTRACE", "1");
    for var in INHERITED_VARS {
        command.env_remove(var);
    }
    for (key, value) in env {
        command.env(key, value);
    }
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command.output().expect("execute wheelhouse command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("cwd={cwd:?}\n"));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
