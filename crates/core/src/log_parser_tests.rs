use super::*;

#[test]
fn phase_start_fires_with_captured_phase_number() {
    let event = parse_line("Starting phase 3/4: Compression from tmp files into final plot");
    assert_eq!(event, Some(LogEvent::PhaseStart { phase: 3 }));
}

#[test]
fn phase_end_fires_with_phase_and_seconds() {
    let event = parse_line("Time for phase 1 = 1234.5 seconds. CPU (188.260%) Mon Jan  1 00:00:00 2026");
    assert_eq!(event, Some(LogEvent::PhaseEnd { phase: 1, seconds: 1234.5 }));
}

#[test]
fn complete_fires_and_captures_quoted_destination_path() {
    let line = r#"Renamed final file from "/plotting/plot-k32.tmp" to "/final/plot-k32-2026-01-01.plot""#;
    let event = parse_line(line);
    assert_eq!(
        event,
        Some(LogEvent::Complete { path: "/final/plot-k32-2026-01-01.plot".to_string() })
    );
}

#[test]
fn unrecognized_lines_produce_no_event() {
    assert_eq!(parse_line("Reading plot table 2"), None);
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("random chatter from the plotter"), None);
}

#[test]
fn line_progress_is_capped_at_98_percent() {
    assert!(line_progress(0) == 0.0);
    assert!((line_progress(PROGRESS_LINE_DENOMINATOR as u64) - 98.0).abs() < 1e-9);
    assert_eq!(line_progress(MAX_TAILED_LINES), 98.0);
}

#[test]
fn inspect_log_file_replays_stage_from_phase_markers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plot.log");
    std::fs::write(
        &path,
        "Starting phase 1/4: Forward\n\
         Time for phase 1 = 10.0 seconds\n\
         Starting phase 2/4: Backward\n",
    )
    .expect("write log");

    let (stage, progress) = inspect_log_file(&path).expect("inspect");
    assert_eq!(stage, crate::stage::Stage::Backward);
    assert!(progress > 0.0 && progress < 98.0);
}
