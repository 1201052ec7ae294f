use chrono::{Duration, NaiveDate};

use crate::models::{Direction, IndicatorKind, PainEntry};
use crate::patterns::{Correlation, TrendPoint};
use crate::stats::{detect_anomalies, linear_regression, mean, round_to, std_dev};

use super::messages::InsightTemplates;
use super::types::PredictiveIndicator;

/// Daily points the rising-trend fit looks back over.
const TREND_LOOKBACK: usize = 14;
const MIN_TREND_POINTS: usize = 5;
/// Slope (points per day) above which the trend counts as rising.
const RISING_SLOPE: f64 = 0.1;

const SPIKE_SIGMA: f64 = 2.0;
const SPIKE_LOOKBACK: usize = 7;

/// Days before the last entry that count as a recent exposure.
const EXPOSURE_DAYS: i64 = 2;

/// Early-warning signals from the tail of the journal: a rising daily
/// trend, a recent spike, and recent exposure to known triggers.
///
/// `entries` must be sorted by timestamp; `trigger_correlations` are the
/// trigger findings of the same analysis.
pub fn predictive_indicators(
    entries: &[PainEntry],
    daily: &[TrendPoint],
    trigger_correlations: &[Correlation],
) -> Vec<PredictiveIndicator> {
    let mut indicators = Vec::new();
    indicators.extend(rising_trend(daily));
    indicators.extend(recent_spike(daily));
    indicators.extend(trigger_exposure(entries, trigger_correlations));

    tracing::debug!(indicators = indicators.len(), "Predictive indicators computed");
    indicators
}

fn rising_trend(daily: &[TrendPoint]) -> Option<PredictiveIndicator> {
    let tail = &daily[daily.len().saturating_sub(TREND_LOOKBACK)..];
    if tail.len() < MIN_TREND_POINTS {
        return None;
    }
    let first = tail[0].date;
    let last = tail[tail.len() - 1].date;
    let xs: Vec<f64> = tail
        .iter()
        .map(|p| (p.date - first).num_days() as f64)
        .collect();
    let ys: Vec<f64> = tail.iter().map(|p| p.value).collect();

    let fit = linear_regression(&xs, &ys)?;
    if fit.slope <= RISING_SLOPE {
        return None;
    }
    Some(PredictiveIndicator {
        kind: IndicatorKind::RisingTrend,
        signal_date: last,
        value: round_to(fit.slope, 2),
        confidence: round_to(fit.r_squared.clamp(0.0, 1.0), 2),
        description: InsightTemplates::rising_trend(fit.slope, tail.len()),
    })
}

fn recent_spike(daily: &[TrendPoint]) -> Option<PredictiveIndicator> {
    let values: Vec<f64> = daily.iter().map(|p| p.value).collect();
    let m = mean(&values);
    let sd = std_dev(&values);
    let recent_from = values.len().saturating_sub(SPIKE_LOOKBACK);

    // Latest upward outlier only; dips are not a warning.
    let index = detect_anomalies(&values, SPIKE_SIGMA)
        .into_iter()
        .filter(|&i| i >= recent_from && values[i] > m)
        .last()?;
    let point = &daily[index];
    let z = (point.value - m) / sd;

    Some(PredictiveIndicator {
        kind: IndicatorKind::RecentSpike,
        signal_date: point.date,
        value: point.value,
        confidence: round_to((z / 4.0).min(1.0), 2),
        description: InsightTemplates::recent_spike(point.value, point.date),
    })
}

fn trigger_exposure(
    entries: &[PainEntry],
    trigger_correlations: &[Correlation],
) -> Vec<PredictiveIndicator> {
    let Some(last) = entries.last() else {
        return Vec::new();
    };
    let cutoff = last
        .date()
        .checked_sub_signed(Duration::days(EXPOSURE_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let recent: Vec<&PainEntry> = entries.iter().filter(|e| e.date() >= cutoff).collect();

    trigger_correlations
        .iter()
        .filter(|c| c.direction == Direction::Increases)
        .filter_map(|c| {
            let seen = recent
                .iter()
                .rev()
                .find(|e| e.triggers.contains(&c.factor))?;
            Some(PredictiveIndicator {
                kind: IndicatorKind::TriggerExposure,
                signal_date: seen.date(),
                value: c.delta_pain,
                confidence: c.confidence,
                description: InsightTemplates::trigger_exposure(&c.factor, c.delta_pain),
            })
        })
        .collect()
}
