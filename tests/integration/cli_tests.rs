use clap::Parser;
use dupfind::cli::Cli;
use dupfind::error::ExitCode;
use dupfind::run_app;
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dupfind", "--quiet", "--no-progress", "--output", "json"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_run_app_duplicates_found() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let code = run_app(cli(&[dir.path().to_str().unwrap()])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_run_app_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"one").unwrap();
    fs::write(dir.path().join("b"), b"two").unwrap();

    let code = run_app(cli(&[dir.path().to_str().unwrap()])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_file_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"content").unwrap();

    let code = run_app(cli(&[file.to_str().unwrap()])).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_with_config_file() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("scan");
    fs::create_dir(&scan).unwrap();
    fs::write(scan.join("a.txt"), b"same").unwrap();
    fs::write(scan.join("b.tmp"), b"same").unwrap();

    let config = dir.path().join("dupfind.toml");
    fs::write(&config, "ignore_patterns = [\"*.tmp\"]\nio_threads = 1\n").unwrap();

    let code = run_app(cli(&[
        scan.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]))
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_missing_config_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    let err = run_app(cli(&[
        dir.path().to_str().unwrap(),
        "--config",
        missing.to_str().unwrap(),
    ]))
    .unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("missing.toml"));
}

fn run_binary(args: &[&str]) -> std::process::Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_dupfind"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_binary_usage_error_is_general_error() {
    let output = run_binary(&["--output", "csv"]);
    assert_eq!(output.status.code(), Some(ExitCode::GeneralError.as_i32()));
    assert!(String::from_utf8_lossy(&output.stderr).contains("csv"));
}

#[test]
fn test_binary_help_and_version_exit_zero() {
    for flag in ["--help", "--version"] {
        let output = run_binary(&[flag]);
        assert_eq!(output.status.code(), Some(0), "{flag}");
        assert!(!output.stdout.is_empty());
    }
}
