//! Text formatting for timer displays

/// Format stopwatch time as `HH:MM:SS.cc`. Hours are not capped at 99.
pub fn format_stopwatch(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let centis = (ms % 1000) / 10;
    format!("{}.{:02}", hms(total_seconds), centis)
}

/// Format countdown time as `HH:MM:SS`, rounding up to the next whole second
/// so the display never reads zero before the final tick
pub fn format_countdown(ms: u64) -> String {
    hms(ms.div_ceil(1000))
}

/// Fraction of the countdown already elapsed, in `0.0..=1.0`
pub fn progress_fraction(total_ms: u64, remaining_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    let done = total_ms.saturating_sub(remaining_ms);
    done as f64 / total_ms as f64
}

fn hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
