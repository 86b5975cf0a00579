//! Human-readable formatting for CLI output.

use std::cmp::Ordering;
use std::time::Duration;

/// Formats a byte count with a binary unit (B, KB, MB, GB).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Formats a duration as "5.0s", "1m 05s" or "1h 01m 05s".
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        3600.. => format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60),
        60.. => format!("{}m {:02}s", secs / 60, secs % 60),
        _ => format!("{}.{}s", secs, d.subsec_millis() / 100),
    }
}

/// Splits a name into alternating text and number runs.
fn natural_parts(s: &str) -> Vec<(bool, &str)> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if in_digits.is_some_and(|d| d != digit) {
            parts.push((!digit, &s[start..i]));
            start = i;
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        parts.push((digit, &s[start..]));
    }
    parts
}

/// Orders catalog names so that embedded numbers compare by value
/// ("Peak 2" before "Peak 10") and text compares case-insensitively.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (pa, pb) = (natural_parts(a), natural_parts(b));
    for ((da, sa), (db, sb)) in pa.iter().zip(&pb) {
        let ord = match (da, db) {
            (true, true) => {
                let (ta, tb) = (sa.trim_start_matches('0'), sb.trim_start_matches('0'));
                ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb))
            }
            _ => sa.to_lowercase().cmp(&sb.to_lowercase()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    pa.len().cmp(&pb.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.00 GB");
        assert_eq!(format_bytes(5 * 1_099_511_627_776), "5120.00 GB");
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(Duration::ZERO), "0.0s");
        assert_eq!(format_duration(Duration::from_millis(500)), "0.5s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 01m 05s");
    }

    #[test]
    fn natural_order() {
        let mut names = vec!["Peak 10", "peak 2", "Peak 1", "Aksu", "Пик 3"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["Aksu", "Peak 1", "peak 2", "Peak 10", "Пик 3"]);
    }

    #[test]
    fn natural_parts_split_runs() {
        assert_eq!(
            natural_parts("a12b"),
            vec![(false, "a"), (true, "12"), (false, "b")]
        );
        assert!(natural_parts("").is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn format_bytes_never_panics(bytes in 0u64..u64::MAX) {
                let _ = format_bytes(bytes);
            }

            #[test]
            fn natural_cmp_is_reflexive(s in "\\PC*") {
                prop_assert_eq!(natural_cmp(&s, &s), Ordering::Equal);
            }

            #[test]
            fn natural_cmp_is_antisymmetric(a in "[a-c0-9]{0,6}", b in "[a-c0-9]{0,6}") {
                prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
            }
        }
    }
}
