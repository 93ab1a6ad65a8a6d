use super::*;

#[test]
fn parse_spec_splits_on_first_colon() {
    let (workspace, destination) = WorkerConfig::parse_spec("/mnt/ws1:/mnt/dest1").unwrap();
    assert_eq!(workspace, PathBuf::from("/mnt/ws1"));
    assert_eq!(destination, PathBuf::from("/mnt/dest1"));
}

#[test]
fn parse_spec_rejects_missing_colon() {
    assert!(WorkerConfig::parse_spec("no-colon-here").is_err());
}

#[test]
fn parse_spec_rejects_empty_halves() {
    assert!(WorkerConfig::parse_spec(":/mnt/dest1").is_err());
    assert!(WorkerConfig::parse_spec("/mnt/ws1:").is_err());
}

#[test]
fn supervisor_config_defaults_match_documented_cli_defaults() {
    let cfg = SupervisorConfig::default();
    assert_eq!(cfg.staggering, Duration::from_secs(600));
    assert!(cfg.use_chiabox);
    assert_eq!(cfg.port, "5000");
}
