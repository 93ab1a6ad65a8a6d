// SPDX-License-Identifier: MIT

//! Age formatting for status payloads.
//!
//! Distinct from a "short" human-readable elapsed format (`"5s"`, `"2m"`) —
//! this one is consumed by API clients polling job age, so it always carries
//! full `HH:MM:SS` precision and only adds a day count when one is due.

use std::time::Duration;

/// Format a duration as `"H days HH:MM:SS"` if it spans one or more whole
/// days, otherwise as `"HH:MM:SS"`.
pub fn format_age(d: Duration) -> String {
    let total_secs = d.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{days} days {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
