use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::PainEntry;
use crate::stats::{mean, moving_average, std_dev};

use super::types::TrendPoint;

pub const WEEK_DAYS: usize = 7;

/// One point per calendar day that has entries, ascending by date.
/// Days without entries produce no point.
pub fn daily_trend(entries: &[PainEntry]) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for entry in entries {
        by_day.entry(entry.date()).or_default().push(entry.pain_level);
    }

    by_day
        .into_iter()
        .map(|(date, values)| TrendPoint {
            date,
            value: mean(&values),
            sample_count: values.len(),
            range: min_max(&values),
            std_dev: Some(std_dev(&values)),
        })
        .collect()
}

/// Trailing 7-point mean of daily means, one point per full window.
///
/// Each point is dated by the window's last day, carries the summed entry
/// count, and the `[min, max]` of the seven daily means. Fewer than 7 daily
/// points yield nothing.
pub fn weekly_trend(daily: &[TrendPoint]) -> Vec<TrendPoint> {
    if daily.len() < WEEK_DAYS {
        return Vec::new();
    }

    let means: Vec<f64> = daily.iter().map(|p| p.value).collect();
    let rolled = moving_average(&means, WEEK_DAYS);

    daily
        .windows(WEEK_DAYS)
        .zip(rolled)
        .map(|(window, value)| {
            let window_means: Vec<f64> = window.iter().map(|p| p.value).collect();
            TrendPoint {
                date: window[WEEK_DAYS - 1].date,
                value,
                sample_count: window.iter().map(|p| p.sample_count).sum(),
                range: min_max(&window_means),
                std_dev: Some(std_dev(&window_means)),
            }
        })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_support::{at_day, entry};

    #[test]
    fn groups_by_day_with_stats() {
        let mut late = entry(0, 6.0);
        late.timestamp = at_day(0) + chrono::Duration::hours(5);
        let entries = vec![entry(0, 2.0), late, entry(2, 5.0)];
        let daily = daily_trend(&entries);

        assert_eq!(daily.len(), 2, "no gap-filling for day 1");
        assert_eq!(daily[0].value, 4.0);
        assert_eq!(daily[0].sample_count, 2);
        assert_eq!(daily[0].range, (2.0, 6.0));
        assert_eq!(daily[0].std_dev, Some(2.0));
        assert_eq!(daily[1].date, at_day(2).date_naive());
        assert_eq!(daily[1].std_dev, Some(0.0));
    }

    #[test]
    fn day_follows_recorder_offset() {
        let mut e = entry(0, 3.0);
        // 23:30 on Jan 1 in UTC-5 is Jan 2 in UTC.
        e.timestamp = chrono::DateTime::parse_from_rfc3339("2025-01-01T23:30:00-05:00").unwrap();
        let daily = daily_trend(&[e]);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn weekly_needs_seven_points() {
        let entries: Vec<PainEntry> = (0..6).map(|d| entry(d, 3.0)).collect();
        assert!(weekly_trend(&daily_trend(&entries)).is_empty());
    }

    #[test]
    fn weekly_is_trailing_mean_of_means() {
        let entries: Vec<PainEntry> = (0..10).map(|d| entry(d, d as f64)).collect();
        let weekly = weekly_trend(&daily_trend(&entries));

        assert_eq!(weekly.len(), 4);
        assert_eq!(weekly[0].value, 3.0);
        assert_eq!(weekly[0].date, at_day(6).date_naive());
        assert_eq!(weekly[0].sample_count, 7);
        assert_eq!(weekly[0].range, (0.0, 6.0));
        assert_eq!(weekly[3].value, 6.0);
    }

    #[test]
    fn empty_input() {
        assert!(daily_trend(&[]).is_empty());
        assert!(weekly_trend(&[]).is_empty());
    }
}
