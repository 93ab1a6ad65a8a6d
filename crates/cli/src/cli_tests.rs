use super::*;
use clap::Parser;

#[test]
fn defaults_match_spec_documented_values() {
    let cli = Cli::parse_from(["plotfleetd"]);
    assert_eq!(cli.run.farm_key, "");
    assert_eq!(cli.run.pool_key, "");
    assert!(cli.run.workers.is_empty());
    assert!(!cli.run.is_mock);
    assert_eq!(cli.run.port, "5000");
    assert_eq!(cli.run.staggering, 600);
    assert_eq!(cli.run.forward_concurrency, 4);
    assert!(cli.run.use_chiabox);
    assert!(cli.command.is_none());
}

#[test]
fn repeated_worker_flags_accumulate_in_order() {
    let cli = Cli::parse_from([
        "plotfleetd",
        "--worker",
        "/mnt/ws1:/mnt/dest1",
        "--worker",
        "/mnt/ws2:/mnt/dest2",
    ]);
    assert_eq!(
        cli.run.workers,
        vec!["/mnt/ws1:/mnt/dest1".to_string(), "/mnt/ws2:/mnt/dest2".to_string()]
    );

    let specs = cli.run.parse_worker_specs().unwrap();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].0, PathBuf::from("/mnt/ws1"));
    assert_eq!(specs[1].1, PathBuf::from("/mnt/dest2"));
}

#[test]
fn malformed_worker_spec_is_rejected_before_startup() {
    let cli = Cli::parse_from(["plotfleetd", "--worker", "not-a-valid-spec"]);
    assert!(cli.run.parse_worker_specs().is_err());
}

#[test]
fn bool_flags_accept_an_explicit_value() {
    let cli = Cli::parse_from(["plotfleetd", "--is_mock", "true", "--use_chiabox", "false"]);
    assert!(cli.run.is_mock);
    assert!(!cli.run.use_chiabox);
}

#[test]
fn staggering_duration_converts_seconds() {
    let cli = Cli::parse_from(["plotfleetd", "--staggering", "10"]);
    assert_eq!(cli.run.staggering_duration(), Duration::from_secs(10));
}

#[test]
fn logs_inspect_subcommand_parses_a_path() {
    let cli = Cli::parse_from(["plotfleetd", "logs", "inspect", "/tmp/some.log"]);
    match cli.command {
        Some(Command::Logs {
            command: LogsCommand::Inspect { path },
        }) => assert_eq!(path, PathBuf::from("/tmp/some.log")),
        other => panic!("expected Logs(Inspect), got {other:?}"),
    }
}
