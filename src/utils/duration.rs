//! Track length formatting

/// Format a length in seconds as `m:ss`, rounding to the nearest second
///
/// Negative and non-finite inputs render as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
