use crate::models::entry::canonicalize;
use crate::models::{parse_timestamp, PainEntry, RawPainEntry, PAIN_MAX, PAIN_MIN};

use super::types::{CleanReport, ExcludedEntry, ExclusionReason};

/// Validate raw entries and return the valid ones, oldest first.
pub fn clean(raw_entries: &[RawPainEntry]) -> Vec<PainEntry> {
    clean_with_report(raw_entries).entries
}

/// Like [`clean`], but also reports which entries were dropped and why.
///
/// Invalid entries are never an error: a bad pain value or timestamp only
/// removes that one record from the analysis.
pub fn clean_with_report(raw_entries: &[RawPainEntry]) -> CleanReport {
    let mut report = CleanReport::default();

    for (index, raw) in raw_entries.iter().enumerate() {
        match validate(raw) {
            Ok((timestamp, pain)) => {
                report
                    .entries
                    .push(canonicalize(raw, index, timestamp, pain));
            }
            Err(reason) => {
                tracing::debug!(index, reason = ?reason, "Excluding invalid pain entry");
                report.excluded.push(ExcludedEntry {
                    index,
                    id: raw.id.clone(),
                    reason,
                });
            }
        }
    }

    // sort_by is stable: entries sharing a timestamp keep their input order.
    report.entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    report
}

fn validate(
    raw: &RawPainEntry,
) -> Result<(chrono::DateTime<chrono::FixedOffset>, f64), ExclusionReason> {
    let pain = raw.canonical_pain().ok_or(ExclusionReason::MissingPain)?;
    if !pain.is_finite() {
        return Err(ExclusionReason::NonFinitePain);
    }
    if !(PAIN_MIN..=PAIN_MAX).contains(&pain) {
        return Err(ExclusionReason::PainOutOfRange);
    }
    let timestamp = parse_timestamp(&raw.timestamp).ok_or(ExclusionReason::InvalidTimestamp)?;
    Ok((timestamp, pain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_out_of_range_pain() {
        let raw = vec![
            RawPainEntry::new("a", "2025-01-01T08:00:00Z", -1.0),
            RawPainEntry::new("b", "2025-01-02T08:00:00Z", 11.0),
            RawPainEntry::new("c", "2025-01-03T08:00:00Z", 5.0),
        ];
        let cleaned = clean(&raw);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].id, "c");
        assert_eq!(cleaned[0].pain_level, 5.0);
    }

    #[test]
    fn reports_each_exclusion_reason() {
        let mut missing = RawPainEntry::new("missing", "2025-01-01", 0.0);
        missing.pain_level = None;
        let raw = vec![
            missing,
            RawPainEntry::new("nan", "2025-01-01", f64::NAN),
            RawPainEntry::new("high", "2025-01-01", 10.5),
            RawPainEntry::new("bad-ts", "yesterday-ish", 4.0),
            RawPainEntry {
                timestamp: json!({"nested": "object"}),
                ..RawPainEntry::new("obj-ts", "", 4.0)
            },
        ];
        let report = clean_with_report(&raw);
        assert!(report.entries.is_empty());
        let reasons: Vec<ExclusionReason> = report.excluded.iter().map(|e| e.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ExclusionReason::MissingPain,
                ExclusionReason::NonFinitePain,
                ExclusionReason::PainOutOfRange,
                ExclusionReason::InvalidTimestamp,
                ExclusionReason::InvalidTimestamp,
            ]
        );
        assert_eq!(report.excluded[3].index, 3);
    }

    #[test]
    fn accepts_boundaries_and_intensity_alias() {
        let mut legacy = RawPainEntry::new("legacy", "2025-01-03", 0.0);
        legacy.pain_level = None;
        legacy.intensity = Some(7.0);
        let raw = vec![
            RawPainEntry::new("zero", "2025-01-01", 0.0),
            RawPainEntry::new("ten", "2025-01-02", 10.0),
            legacy,
        ];
        let cleaned = clean(&raw);
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[2].pain_level, 7.0);
    }

    #[test]
    fn sorts_ascending_and_stable() {
        let raw = vec![
            RawPainEntry::new("late", "2025-01-05T10:00:00Z", 3.0),
            RawPainEntry::new("tie-1", "2025-01-02T10:00:00Z", 4.0),
            RawPainEntry::new("early", "2025-01-01T10:00:00Z", 5.0),
            RawPainEntry::new("tie-2", "2025-01-02T10:00:00Z", 6.0),
        ];
        let ids: Vec<String> = clean(&raw).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["early", "tie-1", "tie-2", "late"]);
    }

    #[test]
    fn compares_instants_across_offsets() {
        let raw = vec![
            RawPainEntry::new("utc", "2025-01-01T10:00:00Z", 3.0),
            // 09:00 UTC, recorded in UTC+2.
            RawPainEntry::new("plus2", "2025-01-01T11:00:00+02:00", 3.0),
        ];
        let ids: Vec<String> = clean(&raw).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["plus2", "utc"]);
    }

    #[test]
    fn far_future_epoch_timestamps_are_excluded() {
        let mut near_limit = RawPainEntry::new("near-limit", "", 4.0);
        near_limit.timestamp = json!(8_210_266_876_799_000_i64);
        let mut year_2199 = RawPainEntry::new("year-2199", "", 4.0);
        // 2199-12-31T12:00:00Z
        year_2199.timestamp = json!(7_258_075_200_000_i64);
        let report = clean_with_report(&[near_limit, year_2199]);

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].id, "year-2199");
        assert_eq!(report.excluded.len(), 1);
        assert_eq!(report.excluded[0].reason, ExclusionReason::InvalidTimestamp);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let report = clean_with_report(&[]);
        assert!(report.entries.is_empty());
        assert!(report.excluded.is_empty());
    }
}
