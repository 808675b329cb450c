// tests/integration/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use termrun::config::load_and_validate;
use termrun::errors::TermrunError;

fn run_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_missing_cmd_returns_config_error() {
    let file = run_file(
        r#"
[task]
name = "nothing"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TermrunError::ConfigError(msg)) => assert!(msg.contains("cmd is required")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_cmd_list_returns_config_error() {
    let file = run_file(
        r#"
[task]
cmd = []
"#,
    );

    match load_and_validate(file.path()) {
        Err(TermrunError::ConfigError(msg)) => assert!(msg.contains("must not be empty")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_cwd_returns_config_error() {
    let file = run_file(
        r#"
[task]
cmd = "true"
cwd = "/definitely/not/a/real/dir"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TermrunError::ConfigError(msg)) => assert!(msg.contains("not an existing directory")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_strategy_option_returns_toml_error() {
    let file = run_file(
        r#"
[strategy]
use_shel = true

[task]
cmd = "true"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TermrunError::TomlError(e)) => assert!(e.to_string().contains("use_shel")),
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_bad_quit_on_exit_value_returns_toml_error() {
    let file = run_file(
        r#"
[strategy]
quit_on_exit = "sometimes"

[task]
cmd = "true"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(TermrunError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));

    assert!(matches!(result, Err(TermrunError::IoError(_))));
}
