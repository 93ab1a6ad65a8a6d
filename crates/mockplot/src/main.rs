// SPDX-License-Identifier: MIT

//! chiafan-plot-sim: a deterministic, time-based stand-in for the real
//! `chia plots create` subprocess (spec.md §4.6 / C6).
//!
//! Produces no real plot. Emits the same three log-line shapes the tail
//! agent in `plotfleet-engine::job` parses — `Starting phase N/4`, `Time
//! for phase N = S seconds`, and a final `Renamed final file from ... to
//! "<path>"` line — on a fixed schedule scaled to `--duration` seconds, so
//! `Job::run`'s stage/progress tracking and its completion check exercise
//! against a real child process rather than an in-process fake.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Fraction of `--duration` at which each phase starts, per spec.md §4.6's
/// "0/20/40/50/60s" schedule (i.e. out of a nominal 60s run).
const PHASE_START_FRACTIONS: [f64; 4] = [0.0, 20.0 / 60.0, 40.0 / 60.0, 50.0 / 60.0];
/// Fraction at which the whole run (and so the last phase) ends.
const END_FRACTION: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(name = "chiafan-plot-sim", about = "Deterministic mock Chia plotter")]
struct Args {
    /// Path the final (empty) plot file is "renamed" to on completion.
    #[arg(long)]
    destination: PathBuf,

    /// Total nominal run length in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    run(args).await;
}

async fn run(args: Args) {
    let phase_starts: Vec<Duration> = PHASE_START_FRACTIONS
        .iter()
        .map(|f| Duration::from_secs_f64(args.duration * f))
        .collect();
    let end = Duration::from_secs_f64(args.duration * END_FRACTION);

    let mut elapsed = Duration::ZERO;
    for (i, start) in phase_starts.iter().enumerate() {
        sleep_until(&mut elapsed, *start).await;
        println!("Starting phase {}/4: simulated phase {}", i + 1, i + 1);

        let phase_end = phase_starts.get(i + 1).copied().unwrap_or(end);
        sleep_until(&mut elapsed, phase_end).await;
        let phase_duration = (phase_end - *start).as_secs_f64();
        println!("Time for phase {} = {:.3} seconds. CPU (1 core) {:.0}%", i + 1, phase_duration, 100.0);
    }

    sleep_until(&mut elapsed, end).await;

    let plot_path = args.destination.display();
    println!("Renamed final file from \"{plot_path}.tmp\" to \"{plot_path}\". Plot Name: mock");
}

/// Sleep only as long as needed to reach `target` total elapsed time,
/// advancing `elapsed` in place. A no-op once `elapsed >= target`.
async fn sleep_until(elapsed: &mut Duration, target: Duration) {
    if target > *elapsed {
        tokio::time::sleep(target - *elapsed).await;
        *elapsed = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_start_fractions_are_monotonic_and_within_duration() {
        let mut prev = 0.0;
        for frac in PHASE_START_FRACTIONS {
            assert!(frac >= prev);
            assert!(frac <= END_FRACTION);
            prev = frac;
        }
    }

    #[tokio::test]
    async fn sleep_until_is_a_no_op_when_already_past_target() {
        let mut elapsed = Duration::from_secs(5);
        sleep_until(&mut elapsed, Duration::from_secs(1)).await;
        assert_eq!(elapsed, Duration::from_secs(5));
    }
}
