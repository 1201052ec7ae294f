use chrono::{DateTime, Duration, Utc};

use crate::models::{ConfidenceLevel, PainEntry};
use crate::stats::median;

use super::types::BaselineResult;

/// Below this many in-window entries the whole history is used instead.
const MIN_WINDOW_ENTRIES: usize = 7;
const MEDIUM_CONFIDENCE_ENTRIES: usize = 14;
const HIGH_CONFIDENCE_ENTRIES: usize = 30;

pub const BASELINE_METHOD: &str = "median";

/// Median pain over the last `window_days` before `now`.
///
/// The median keeps a single flare day from dragging the reference point
/// up. A window holding fewer than 7 entries falls back to all entries.
pub fn baseline(entries: &[PainEntry], window_days: usize, now: DateTime<Utc>) -> BaselineResult {
    if entries.is_empty() {
        return BaselineResult {
            value: 0.0,
            method: BASELINE_METHOD.to_string(),
            confidence: ConfidenceLevel::Low,
            window_days,
            entry_count: 0,
        };
    }

    // A window reaching past the representable range covers everything.
    let cutoff = i64::try_from(window_days)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|window| now.checked_sub_signed(window));
    let in_window: Vec<f64> = entries
        .iter()
        .filter(|e| cutoff.map_or(true, |c| e.timestamp >= c))
        .map(|e| e.pain_level)
        .collect();

    let values = if in_window.len() >= MIN_WINDOW_ENTRIES {
        in_window
    } else {
        tracing::debug!(
            in_window = in_window.len(),
            total = entries.len(),
            "Baseline window underfilled, using full history"
        );
        entries.iter().map(|e| e.pain_level).collect()
    };

    BaselineResult {
        value: median(&values),
        method: BASELINE_METHOD.to_string(),
        confidence: ConfidenceLevel::from_count(
            values.len(),
            MEDIUM_CONFIDENCE_ENTRIES,
            HIGH_CONFIDENCE_ENTRIES,
        ),
        window_days,
        entry_count: values.len(),
    }
}
