//! Tests for CLI argument parsing
//!
//! These tests verify that command line arguments are parsed as expected and
//! that they override the configuration file.

use clap::Parser;
use door_access_control::types::config::{CliArgs, ConfigValidationError, ControlConfig};
use std::io::Write;

fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
    let mut full = vec!["door-access-control"];
    full.extend_from_slice(args);
    CliArgs::try_parse_from(full)
}

/// Test the defaults of every optional argument
#[test]
fn test_default_arguments() {
    let args = parse(&[]).unwrap();

    assert!(args.config.is_none());
    assert!(args.credential.is_none());
    assert!(args.action.is_none());
    assert!(args.door.is_none());
    assert!(args.area.is_none());
    assert!(args.requests.is_none());
    assert!(args.at.is_none());
    assert_eq!(args.hold_secs, 0);
    assert!(!args.list_doors);
    assert!(!args.verbose);
    assert!(!args.debug);
    assert!(!args.dry_run);
    assert!(!args.print_config);
}

/// Test a single door request
#[test]
fn test_door_request_arguments() {
    let args = parse(&[
        "--credential",
        "74984",
        "--action",
        "unlock shortly",
        "--door",
        "D3",
        "--at",
        "2025-10-06 10:00:00",
    ])
    .unwrap();

    assert_eq!(args.credential.as_deref(), Some("74984"));
    assert_eq!(args.action.as_deref(), Some("unlock shortly"));
    assert_eq!(args.door.as_deref(), Some("D3"));
    assert_eq!(args.at.as_deref(), Some("2025-10-06 10:00:00"));
}

/// Test that a request targets either a door or an area
#[test]
fn test_door_conflicts_with_area() {
    let result = parse(&["--credential", "1", "--action", "lock", "--door", "D3", "--area", "hall"]);
    assert!(result.is_err());

    let args = parse(&["--credential", "1", "--action", "lock", "--area", "hall"]).unwrap();
    assert_eq!(args.area.as_deref(), Some("hall"));
    assert!(args.door.is_none());
}

/// Test replay and clock arguments
#[test]
fn test_replay_arguments() {
    let args = parse(&[
        "--requests",
        "requests.jsonl",
        "--hold-secs",
        "12",
        "--list-doors",
        "--tick-interval-ms",
        "250",
        "--unlock-shortly-secs",
        "5",
    ])
    .unwrap();

    assert_eq!(args.requests.as_deref(), Some("requests.jsonl"));
    assert_eq!(args.hold_secs, 12);
    assert!(args.list_doors);
    assert_eq!(args.tick_interval_ms, Some(250));
    assert_eq!(args.unlock_shortly_secs, Some(5));
}

/// Test that malformed numbers are rejected by the parser
#[test]
fn test_invalid_numbers_are_rejected() {
    assert!(parse(&["--hold-secs", "soon"]).is_err());
    assert!(parse(&["--tick-interval-ms", "-5"]).is_err());
    assert!(parse(&["--unlock-shortly-secs", "ten"]).is_err());
}

/// Test logging and mode flags, long and short
#[test]
fn test_mode_flags() {
    let args = parse(&["-v", "--dry-run"]).unwrap();
    assert!(args.verbose);
    assert!(args.dry_run);

    let args = parse(&["--debug", "--print-config"]).unwrap();
    assert!(args.debug);
    assert!(args.print_config);
}

/// Test that CLI overrides feed into the validated configuration
#[test]
fn test_overrides_reach_configuration() {
    let args = parse(&["--tick-interval-ms", "100", "--unlock-shortly-secs", "3"]).unwrap();
    let config = ControlConfig::from_cli_args(args).unwrap();

    assert_eq!(config.tick_interval_ms, 100);
    assert_eq!(config.unlock_shortly_secs, 3);
    assert!(config.validate().is_ok());
    assert_eq!(config.unlock_shortly_window(), chrono::Duration::seconds(3));
}

/// Test that invalid overrides are caught by validation
#[test]
fn test_invalid_overrides_fail_validation() {
    let args = parse(&["--unlock-shortly-secs", "0"]).unwrap();
    let config = ControlConfig::from_cli_args(args).unwrap();
    assert_eq!(config.validate(), Err(ConfigValidationError::InvalidUnlockShortlyPeriod(0)));

    let args = parse(&["--tick-interval-ms", "20000"]).unwrap();
    let config = ControlConfig::from_cli_args(args).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::TickSlowerThanWindow { tick_ms: 20_000, window_secs: 10 })
    ));
}

/// Test a configuration file combined with CLI overrides
#[test]
fn test_config_file_with_overrides() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    writeln!(
        file,
        r#"{{ "tick_interval_ms": 500, "default_door_closed": false, "json_logs": true }}"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let args = parse(&["-c", &path, "--tick-interval-ms", "200"]).unwrap();
    let config = ControlConfig::from_cli_args(args).unwrap();

    assert_eq!(config.tick_interval_ms, 200);
    assert_eq!(config.unlock_shortly_secs, 10);
    assert!(!config.default_door_closed);
    assert!(config.json_logs);
}

/// Test that a missing configuration file is reported
#[test]
fn test_missing_config_file() {
    let args = parse(&["--config", "/no/such/config.json"]).unwrap();
    assert!(ControlConfig::from_cli_args(args).is_err());
}

/// Test the printed default configuration
#[test]
fn test_print_config_output() {
    let json = ControlConfig::default().print_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["tick_interval_ms"], 1000);
    assert_eq!(value["unlock_shortly_secs"], 10);
    assert_eq!(value["default_door_closed"], true);
}
