use chrono::{Duration, NaiveDate};

use crate::config::AnalysisConfig;
use crate::models::{
    ConfidenceLevel, CorrelationStrength, Direction, DissonanceSeverity, DissonanceType,
    PainEntry, PainTrend, QolDimension,
};
use crate::stats::{mean, round_to};

use super::correlation::classify_strength;
use super::messages::MessageTemplates;
use super::types::{BaselineResult, QolDissonance, QolPattern, TrendPoint};

/// Minimum samples in at least one bucket before a QoL pattern is reported.
const MIN_BUCKET_SAMPLES: usize = 3;
const MEDIUM_EVIDENCE: usize = 10;
const HIGH_EVIDENCE: usize = 20;

const DISSONANCE_MIN_ENTRIES: usize = 14;
const DISSONANCE_MIN_TREND_POINTS: usize = 7;
const DISSONANCE_MIN_WINDOW_SAMPLES: usize = 3;
const PAIN_TREND_BAND: f64 = 0.5;
const SLEEP_DROP_FLAG: f64 = 1.5;
const SLEEP_DROP_HIGH: f64 = 2.5;

/// Good / poor cut-offs for one QoL dimension. Values strictly between the
/// two belong to neither bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QolThresholds {
    pub good_at_least: f64,
    pub poor_at_most: f64,
}

pub fn qol_thresholds(dimension: QolDimension) -> QolThresholds {
    match dimension {
        QolDimension::Sleep => QolThresholds {
            good_at_least: 7.0,
            poor_at_most: 4.0,
        },
        QolDimension::Mood => QolThresholds {
            good_at_least: 2.0,
            poor_at_most: -2.0,
        },
        QolDimension::Activity => QolThresholds {
            good_at_least: 6.0,
            poor_at_most: 3.0,
        },
    }
}

fn field_name(dimension: QolDimension) -> &'static str {
    match dimension {
        QolDimension::Sleep => "sleepQuality",
        QolDimension::Mood => "moodImpact",
        QolDimension::Activity => "activityLevel",
    }
}

/// Compare pain when a QoL dimension is good against when it is poor.
pub fn qol_patterns(
    entries: &[PainEntry],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
) -> Vec<QolPattern> {
    QolDimension::ALL
        .iter()
        .filter_map(|dimension| qol_pattern(entries, baseline, config, *dimension))
        .collect()
}

fn qol_pattern(
    entries: &[PainEntry],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
    dimension: QolDimension,
) -> Option<QolPattern> {
    let thresholds = qol_thresholds(dimension);
    let present: Vec<(f64, f64)> = entries
        .iter()
        .filter_map(|e| e.qol(dimension).map(|v| (v, e.pain_level)))
        .collect();

    if present.len() < config.min_support_for_correlation {
        return None;
    }

    let good: Vec<f64> = present
        .iter()
        .filter(|(v, _)| *v >= thresholds.good_at_least)
        .map(|(_, pain)| *pain)
        .collect();
    let poor: Vec<f64> = present
        .iter()
        .filter(|(v, _)| *v <= thresholds.poor_at_most)
        .map(|(_, pain)| *pain)
        .collect();

    if good.len() < MIN_BUCKET_SAMPLES && poor.len() < MIN_BUCKET_SAMPLES {
        return None;
    }

    let bucket_mean = |bucket: &[f64]| {
        if bucket.is_empty() {
            baseline.value
        } else {
            mean(bucket)
        }
    };
    let good_mean = bucket_mean(&good);
    let poor_mean = bucket_mean(&poor);
    let delta = good_mean - poor_mean;

    let confidence =
        ConfidenceLevel::from_count(good.len() + poor.len(), MEDIUM_EVIDENCE, HIGH_EVIDENCE);
    let strength = classify_strength(delta, confidence.weight());
    if strength == CorrelationStrength::None {
        return None;
    }

    let condition = format!("{} <= {}", field_name(dimension), thresholds.poor_at_most);
    Some(QolPattern {
        dimension,
        delta: round_to(delta, 2),
        good_mean: round_to(good_mean, 2),
        poor_mean: round_to(poor_mean, 2),
        good_count: good.len(),
        poor_count: poor.len(),
        confidence,
        strength,
        direction: Direction::from_delta(delta),
        description: MessageTemplates::qol_pattern(dimension, &condition, delta),
        condition,
    })
}

/// Classify a change in mean pain between two windows.
pub fn classify_pain_trend(change: f64) -> PainTrend {
    if change > PAIN_TREND_BAND {
        PainTrend::Worsening
    } else if change < -PAIN_TREND_BAND {
        PainTrend::Improving
    } else {
        PainTrend::Stable
    }
}

/// Flag QoL movements that disagree with the pain trend over the last two
/// 7-day windows of the daily trend.
///
/// Only the sleep-decline-while-pain-stable case is detected.
pub fn qol_dissonances(
    entries: &[PainEntry],
    daily: &[TrendPoint],
    patterns: &[QolPattern],
) -> Vec<QolDissonance> {
    if entries.len() < DISSONANCE_MIN_ENTRIES || daily.len() < DISSONANCE_MIN_TREND_POINTS {
        return Vec::new();
    }
    let Some(last) = daily.last().map(|p| p.date) else {
        return Vec::new();
    };

    let back = |days: i64| last.checked_sub_signed(Duration::days(days));
    let (Some(recent_from), Some(prior_to), Some(prior_from)) = (back(6), back(7), back(13)) else {
        return Vec::new();
    };
    let recent = (recent_from, last);
    let prior = (prior_from, prior_to);
    let in_window = |date: NaiveDate, (from, to): (NaiveDate, NaiveDate)| date >= from && date <= to;

    let pain_in = |window: (NaiveDate, NaiveDate)| -> Vec<f64> {
        daily
            .iter()
            .filter(|p| in_window(p.date, window))
            .map(|p| p.value)
            .collect()
    };
    let recent_pain = pain_in(recent);
    let prior_pain = pain_in(prior);
    if recent_pain.is_empty() || prior_pain.is_empty() {
        return Vec::new();
    }
    let pain_change = mean(&recent_pain) - mean(&prior_pain);
    let pain_trend = classify_pain_trend(pain_change);

    let mut dissonances = Vec::new();

    let sleep_in = |window: (NaiveDate, NaiveDate)| -> Vec<f64> {
        entries
            .iter()
            .filter(|e| in_window(e.date(), window))
            .filter_map(|e| e.sleep_quality)
            .collect()
    };
    let recent_sleep = sleep_in(recent);
    let prior_sleep = sleep_in(prior);

    if recent_sleep.len() >= DISSONANCE_MIN_WINDOW_SAMPLES
        && prior_sleep.len() >= DISSONANCE_MIN_WINDOW_SAMPLES
    {
        let sleep_change = mean(&recent_sleep) - mean(&prior_sleep);
        let drop = -sleep_change;
        if pain_trend == PainTrend::Stable && drop > SLEEP_DROP_FLAG {
            let severity = if drop > SLEEP_DROP_HIGH {
                DissonanceSeverity::High
            } else {
                DissonanceSeverity::Medium
            };
            dissonances.push(QolDissonance {
                dissonance_type: DissonanceType::SleepDeclinePainStable,
                severity,
                metric: QolDimension::Sleep,
                pain_trend,
                pain_change: round_to(pain_change, 2),
                metric_change: round_to(sleep_change, 2),
                window_start: prior.0,
                window_end: recent.1,
                description: MessageTemplates::sleep_decline_pain_stable(drop),
                related_pattern: patterns
                    .iter()
                    .find(|p| p.dimension == QolDimension::Sleep)
                    .map(|p| p.description.clone()),
            });
        }
    }

    dissonances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_support::{entry, entry_with};
    use crate::patterns::trend::daily_trend;

    fn baseline_at(value: f64) -> BaselineResult {
        BaselineResult {
            value,
            method: "median".into(),
            confidence: ConfidenceLevel::Medium,
            window_days: 30,
            entry_count: 20,
        }
    }

    fn sleep_entry(day: i64, pain: f64, sleep: f64) -> PainEntry {
        entry_with(day, pain, |e| e.sleep_quality = Some(sleep))
    }

    #[test]
    fn poor_sleep_goes_with_more_pain() {
        let mut entries: Vec<PainEntry> = (0..10).map(|d| sleep_entry(d, 3.0, 8.0)).collect();
        entries.extend((10..20).map(|d| sleep_entry(d, 7.0, 3.0)));

        let patterns = qol_patterns(&entries, &baseline_at(5.0), &AnalysisConfig::default());
        assert_eq!(patterns.len(), 1);
        let sleep = &patterns[0];
        assert_eq!(sleep.dimension, QolDimension::Sleep);
        assert_eq!(sleep.delta, -4.0);
        assert_eq!(sleep.confidence, ConfidenceLevel::High);
        assert_eq!(sleep.strength, CorrelationStrength::Strong);
        assert_eq!(sleep.direction, Direction::Decreases);
        assert_eq!(sleep.condition, "sleepQuality <= 4");
    }

    #[test]
    fn neutral_zone_values_are_excluded() {
        let mut entries: Vec<PainEntry> = (0..4).map(|d| sleep_entry(d, 2.0, 8.0)).collect();
        entries.extend((4..8).map(|d| sleep_entry(d, 6.0, 2.0)));
        entries.extend((8..20).map(|d| sleep_entry(d, 9.0, 5.5)));

        let patterns = qol_patterns(&entries, &baseline_at(5.0), &AnalysisConfig::default());
        let sleep = &patterns[0];
        assert_eq!(sleep.good_count, 4);
        assert_eq!(sleep.poor_count, 4);
        assert_eq!(sleep.delta, -4.0);
        assert_eq!(sleep.confidence, ConfidenceLevel::Low);
        assert_eq!(sleep.strength, CorrelationStrength::Strong);
    }

    #[test]
    fn too_little_qol_data_reports_nothing() {
        let entries: Vec<PainEntry> = (0..5).map(|d| sleep_entry(d, 3.0, 9.0)).collect();
        assert!(qol_patterns(&entries, &baseline_at(5.0), &AnalysisConfig::default()).is_empty());

        // Enough values, but both buckets under 3 samples.
        let mut sparse: Vec<PainEntry> = (0..2).map(|d| sleep_entry(d, 3.0, 9.0)).collect();
        sparse.extend((2..4).map(|d| sleep_entry(d, 8.0, 1.0)));
        sparse.extend((4..10).map(|d| sleep_entry(d, 5.0, 5.0)));
        assert!(qol_patterns(&sparse, &baseline_at(5.0), &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn empty_bucket_uses_baseline() {
        let entries: Vec<PainEntry> = (0..10)
            .map(|d| entry_with(d, 8.0, |e| e.mood_impact = Some(-4.0)))
            .collect();
        let patterns = qol_patterns(&entries, &baseline_at(4.0), &AnalysisConfig::default());
        assert_eq!(patterns.len(), 1);
        let mood = &patterns[0];
        assert_eq!(mood.dimension, QolDimension::Mood);
        assert_eq!(mood.good_mean, 4.0);
        assert_eq!(mood.delta, -4.0);
        assert_eq!(mood.confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn pain_trend_band() {
        assert_eq!(classify_pain_trend(0.6), PainTrend::Worsening);
        assert_eq!(classify_pain_trend(-0.6), PainTrend::Improving);
        assert_eq!(classify_pain_trend(0.5), PainTrend::Stable);
    }

    fn two_weeks(pain: impl Fn(i64) -> f64, prior_sleep: f64, recent_sleep: f64) -> Vec<PainEntry> {
        (0..14)
            .map(|d| {
                let sleep = if d < 7 { prior_sleep } else { recent_sleep };
                sleep_entry(d, pain(d), sleep)
            })
            .collect()
    }

    #[test]
    fn sleep_decline_with_stable_pain_is_flagged() {
        let entries = two_weeks(|_| 4.0, 8.0, 5.0);
        let daily = daily_trend(&entries);
        let found = qol_dissonances(&entries, &daily, &[]);

        assert_eq!(found.len(), 1);
        let d = &found[0];
        assert_eq!(d.dissonance_type, DissonanceType::SleepDeclinePainStable);
        assert_eq!(d.severity, DissonanceSeverity::High);
        assert_eq!(d.pain_trend, PainTrend::Stable);
        assert_eq!(d.metric_change, -3.0);
        assert_eq!(d.related_pattern, None);
    }

    #[test]
    fn moderate_sleep_decline_is_medium() {
        let entries = two_weeks(|_| 4.0, 8.0, 6.0);
        let found = qol_dissonances(&entries, &daily_trend(&entries), &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, DissonanceSeverity::Medium);
    }

    #[test]
    fn worsening_pain_is_not_dissonant() {
        let entries = two_weeks(|d| if d < 7 { 3.0 } else { 6.0 }, 8.0, 4.0);
        assert!(qol_dissonances(&entries, &daily_trend(&entries), &[]).is_empty());
    }

    #[test]
    fn dissonance_needs_enough_data() {
        let short: Vec<PainEntry> = two_weeks(|_| 4.0, 8.0, 4.0).into_iter().take(13).collect();
        assert!(qol_dissonances(&short, &daily_trend(&short), &[]).is_empty());

        // Sleep logged only twice in the recent window.
        let mut sparse = two_weeks(|_| 4.0, 8.0, 4.0);
        for e in sparse.iter_mut().skip(9) {
            e.sleep_quality = None;
        }
        assert!(qol_dissonances(&sparse, &daily_trend(&sparse), &[]).is_empty());

        let no_sleep: Vec<PainEntry> = (0..14).map(|d| entry(d, 4.0)).collect();
        assert!(qol_dissonances(&no_sleep, &daily_trend(&no_sleep), &[]).is_empty());
    }

    #[test]
    fn dissonance_needs_seven_tracked_days() {
        // 18 entries on 6 days: both windows hold three sleep samples per
        // day and sleep drops by 4, but the trend is too short.
        let entries: Vec<PainEntry> = [0, 1, 2, 8, 9, 10]
            .into_iter()
            .flat_map(|d| {
                let sleep = if d < 8 { 8.0 } else { 4.0 };
                (0..3).map(move |_| sleep_entry(d, 4.0, sleep))
            })
            .collect();
        let daily = daily_trend(&entries);
        assert_eq!(entries.len(), 18);
        assert_eq!(daily.len(), 6);
        assert!(qol_dissonances(&entries, &daily, &[]).is_empty());
    }

    #[test]
    fn low_activity_goes_with_more_pain() {
        let activity_entry =
            |day: i64, pain: f64, level: f64| entry_with(day, pain, |e| e.activity_level = Some(level));
        let mut entries: Vec<PainEntry> = (0..10).map(|d| activity_entry(d, 3.0, 8.0)).collect();
        entries.extend((10..20).map(|d| activity_entry(d, 7.0, 2.0)));
        // Between the cut-offs: counted as present, in neither bucket.
        entries.extend((20..24).map(|d| activity_entry(d, 5.0, 4.5)));

        let patterns = qol_patterns(&entries, &baseline_at(5.0), &AnalysisConfig::default());
        assert_eq!(patterns.len(), 1);
        let activity = &patterns[0];
        assert_eq!(activity.dimension, QolDimension::Activity);
        assert_eq!(activity.good_count, 10);
        assert_eq!(activity.poor_count, 10);
        assert_eq!(activity.good_mean, 3.0);
        assert_eq!(activity.poor_mean, 7.0);
        assert_eq!(activity.delta, -4.0);
        assert_eq!(activity.confidence, ConfidenceLevel::High);
        assert_eq!(activity.direction, Direction::Decreases);
        assert_eq!(activity.condition, "activityLevel <= 3");
    }
}
