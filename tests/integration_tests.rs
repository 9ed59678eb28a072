//! Integration tests: CLI smoke tests and end-to-end organize/index runs
//! against scratch trees.

mod common;

use std::fs;
use std::path::Path;

use serde_json::Value;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), name.as_bytes()).expect("write fixture");
}

fn wheel_fixture() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    for name in [
        "discord_py-1.7.3-py3-none-any.whl",
        "lru_dict-1.1.6-cp38-cp38-linux_x86_64.whl",
        "yarl-1.5.1-py3-none-any.whl",
        "notes.txt",
    ] {
        touch(tmp.path(), name);
    }
    tmp
}

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: wheelhouse [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains(env!("CARGO_PKG_VERSION")),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn subcommand_help_flags_work() {
    for subcommand in ["organize", "index", "config", "completions"] {
        let result = common::run_cli_case(
            &format!("subcommand_help_{subcommand}"),
            &[subcommand, "--help"],
        );
        assert!(
            result.status.success(),
            "{subcommand} --help failed; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn organize_moves_wheels_into_package_directories() {
    let tmp = wheel_fixture();
    let root = tmp.path();

    let result = common::run_cli_case_in("organize_e2e", Some(root), &["organize"], &[]);
    assert!(
        result.status.success(),
        "organize failed; log: {}",
        result.log_path.display()
    );

    assert!(root.join("discord.py/discord.py-1.7.3-py3-none-any.whl").is_file());
    assert!(root.join("lru-dict/lru-dict-1.1.6-cp38-cp38-linux_x86_64.whl").is_file());
    assert!(root.join("yarl/yarl-1.5.1-py3-none-any.whl").is_file());
    assert!(root.join("notes.txt").is_file());
    assert!(!root.join("yarl-1.5.1-py3-none-any.whl").exists());

    assert!(result.stdout.contains("Found discord.py, preparing to move."));
    assert!(result.stdout.contains("No directory for"));
    assert!(result.stdout.contains("Moving file to"));
    assert!(!result.stdout.contains("No files found to work on."));
}

#[test]
fn organize_rerun_reports_no_files() {
    let tmp = wheel_fixture();
    let root = tmp.path();
    let dir = root.to_str().expect("utf-8 tempdir");

    let first = common::run_cli_case("organize_first_run", &["organize", dir]);
    assert!(first.status.success(), "log: {}", first.log_path.display());

    let second = common::run_cli_case("organize_second_run", &["organize", dir]);
    assert!(second.status.success(), "log: {}", second.log_path.display());
    assert!(
        second.stdout.contains("No files found to work on."),
        "log: {}",
        second.log_path.display()
    );
    assert!(!second.stdout.contains("Found"));
}

#[test]
fn organize_existing_directory_is_reused_quietly() {
    let tmp = wheel_fixture();
    let root = tmp.path();
    fs::create_dir(root.join("yarl")).expect("pre-create");

    let result = common::run_cli_case_in("organize_existing_dir", Some(root), &["organize"], &[]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(!result.stdout.contains("No directory for yarl"));
    assert!(root.join("yarl/yarl-1.5.1-py3-none-any.whl").is_file());
}

#[test]
fn organize_dry_run_leaves_tree_untouched() {
    let tmp = wheel_fixture();
    let root = tmp.path();

    let result = common::run_cli_case_in(
        "organize_dry_run",
        Some(root),
        &["--json", "organize", "--dry-run"],
        &[],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let payload: Value = serde_json::from_str(result.stdout.trim()).expect("json payload");
    assert_eq!(payload["command"], "organize");
    assert_eq!(payload["dry_run"], true);
    assert_eq!(payload["moved"].as_array().map(Vec::len), Some(3));
    assert!(root.join("yarl-1.5.1-py3-none-any.whl").is_file());
    assert!(!root.join("yarl").exists());
}

#[test]
fn organize_missing_directory_is_a_user_error() {
    let tmp = TempDir::new().expect("tempdir");
    let missing = tmp.path().join("missing");

    let result = common::run_cli_case(
        "organize_missing_dir",
        &["organize", missing.to_str().expect("utf-8")],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("wheelhouse: [WH-3001]"));
}

#[test]
fn index_writes_page_into_every_directory() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    fs::create_dir_all(root.join("yarl")).expect("mkdir");
    fs::create_dir_all(root.join("aiohttp/old")).expect("mkdir");
    touch(&root.join("yarl"), "yarl-1.5.1-py3-none-any.whl");
    fs::write(root.join("yarl/README.md"), "# Hello\n").expect("readme");

    let result = common::run_cli_case_in("index_e2e", Some(root), &["index"], &[]);
    assert!(result.status.success(), "log: {}", result.log_path.display());

    for dir in ["", "yarl", "aiohttp", "aiohttp/old"] {
        assert!(
            root.join(dir).join("index.html").is_file(),
            "missing index in {dir:?}; log: {}",
            result.log_path.display()
        );
    }
    assert_eq!(result.stdout.matches("Generated ").count(), 4);

    let page = fs::read_to_string(root.join("yarl/index.html")).expect("read page");
    assert!(page.contains("<h1>/pip/yarl</h1>"));
    assert!(page.contains("<h1>Hello</h1>"));
    assert!(page.contains("yarl-1.5.1-py3-none-any.whl#sha256="));
    assert!(page.contains("settings_applications"));

    let root_page = fs::read_to_string(root.join("index.html")).expect("read root page");
    let aiohttp = root_page.find("aiohttp/</a>").expect("aiohttp link");
    let yarl = root_page.find("yarl/</a>").expect("yarl link");
    assert!(aiohttp < yarl);
    assert!(!root_page.contains(">index.html<"));
}

#[test]
fn index_flags_disable_enrichments() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    touch(root, "yarl-1.5.1-py3-none-any.whl");
    fs::write(root.join("README.md"), "# Hello\n").expect("readme");

    let result = common::run_cli_case_in(
        "index_no_enrichments",
        Some(root),
        &["index", "--no-checksums", "--no-readme"],
        &[],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let page = fs::read_to_string(root.join("index.html")).expect("read page");
    assert!(!page.contains("#sha256="));
    assert!(!page.contains("class=\"readme\""));
}

#[test]
fn organize_then_index_pipeline_with_json_and_activity_log() {
    let tmp = wheel_fixture();
    let root = tmp.path();
    let log = TempDir::new().expect("log dir");
    let log_path = log.path().join("activity.jsonl");
    let log_str = log_path.to_str().expect("utf-8");
    let env = [("WHEELHOUSE_LOG_JSONL", log_str)];

    let organize = common::run_cli_case_in("pipeline_organize", Some(root), &["organize"], &env);
    assert!(organize.status.success(), "log: {}", organize.log_path.display());

    let index = common::run_cli_case_in(
        "pipeline_index",
        Some(root),
        &["--json", "index", "--jobs", "3"],
        &env,
    );
    assert!(index.status.success(), "log: {}", index.log_path.display());

    let payload: Value = serde_json::from_str(index.stdout.trim()).expect("json payload");
    assert_eq!(payload["command"], "index");
    let pages = payload["pages"].as_array().expect("pages array");
    assert_eq!(pages.len(), 4);

    let discord = fs::read_to_string(root.join("discord.py/index.html")).expect("read page");
    assert!(discord.contains("<h1>/pip/discord.py</h1>"));
    assert!(discord.contains("discord.py-1.7.3-py3-none-any.whl"));

    let events: Vec<Value> = fs::read_to_string(&log_path)
        .expect("activity log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("jsonl line"))
        .collect();
    let count = |event: &str| events.iter().filter(|e| e["event"] == event).count();
    assert_eq!(count("run_start"), 2);
    assert_eq!(count("artifact_move"), 3);
    assert_eq!(count("directory_create"), 3);
    assert_eq!(count("index_write"), 4);
    assert_eq!(count("run_complete"), 2);
}

#[test]
fn organize_failure_still_logs_completed_moves() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    touch(root, "aaa-1.0-py3-none-any.whl");
    touch(root, "zzz-1.0-py3-none-any.whl");
    fs::write(root.join("zzz"), b"not a directory").expect("blocker");
    let log = TempDir::new().expect("log dir");
    let log_path = log.path().join("activity.jsonl");
    let env = [("WHEELHOUSE_LOG_JSONL", log_path.to_str().expect("utf-8"))];

    let result = common::run_cli_case_in(
        "organize_partial_failure",
        Some(root),
        &["organize"],
        &env,
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("WH-3001"));
    assert!(root.join("aaa/aaa-1.0-py3-none-any.whl").is_file());
    assert!(root.join("zzz-1.0-py3-none-any.whl").is_file());

    let events: Vec<Value> = fs::read_to_string(&log_path)
        .expect("activity log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("jsonl line"))
        .collect();
    let count = |event: &str| events.iter().filter(|e| e["event"] == event).count();
    assert_eq!(count("directory_create"), 1);
    assert_eq!(count("artifact_move"), 1);
    assert_eq!(count("error"), 1);
    assert_eq!(count("run_complete"), 0);
}

#[test]
fn organize_moves_dot_file_archive_without_aborting() {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();
    touch(root, ".whl");
    touch(root, "yarl-1.5.1-py3-none-any.whl");

    let result = common::run_cli_case_in("organize_dot_file", Some(root), &["organize"], &[]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(root.join("whl/.whl").is_file());
    assert!(root.join("yarl/yarl-1.5.1-py3-none-any.whl").is_file());
}

#[test]
fn config_validate_reports_invalid_file() {
    let tmp = TempDir::new().expect("tempdir");
    let config = tmp.path().join("config.toml");
    fs::write(&config, "[index]\nparallelism = 0\n").expect("write config");

    let result = common::run_cli_case(
        "config_validate_invalid",
        &["--config", config.to_str().expect("utf-8"), "config", "validate"],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("WH-1001"));
}

#[test]
fn config_show_json_reflects_file_values() {
    let tmp = TempDir::new().expect("tempdir");
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[organize]\narchive_pattern = \"*.tar.gz\"\n\n[organize.aliases]\nruamel_yaml = \"ruamel.yaml\"\n",
    )
    .expect("write config");

    let result = common::run_cli_case(
        "config_show_json",
        &["--json", "--config", config.to_str().expect("utf-8"), "config", "show"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let payload: Value = serde_json::from_str(result.stdout.trim()).expect("json payload");
    assert_eq!(payload["config"]["organize"]["archive_pattern"], "*.tar.gz");
    assert_eq!(
        payload["config"]["organize"]["aliases"]["ruamel_yaml"],
        "ruamel.yaml"
    );
}

#[test]
fn completions_generate_script() {
    let result = common::run_cli_case("completions_bash", &["completions", "bash"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("wheelhouse"));
}
