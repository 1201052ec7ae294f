use std::collections::{BTreeMap, BTreeSet};

use crate::config::AnalysisConfig;
use crate::models::{CorrelationStrength, Direction, FactorKind, PainEntry};
use crate::stats::{mean, round_to, variance};

use super::messages::MessageTemplates;
use super::types::{BaselineResult, Correlation, TriggerBundle};

/// Minimum co-occurrences for a trigger bundle, whatever the support setting.
const MIN_BUNDLE_OCCURRENCES: usize = 3;

/// Bucket a pain delta into a strength, given its evidential consistency.
///
/// `none` when confidence < 0.5 or |delta| < 0.3; then weak < 0.7,
/// moderate < 1.5, strong otherwise.
pub fn classify_strength(delta: f64, confidence: f64) -> CorrelationStrength {
    let magnitude = delta.abs();
    if confidence < 0.5 || magnitude < 0.3 {
        CorrelationStrength::None
    } else if magnitude < 0.7 {
        CorrelationStrength::Weak
    } else if magnitude < 1.5 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

/// Correlate every distinct factor of `kind` with pain.
///
/// For each factor the "with" sample is every entry carrying it and the
/// "without" sample every other cleaned entry. A factor surfaces only when
/// its support, strength and display confidence all pass. Sorted by
/// |delta| descending.
pub fn correlate(
    entries: &[PainEntry],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
    kind: FactorKind,
) -> Vec<Correlation> {
    let factors: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.factors(kind).iter().map(String::as_str))
        .collect();

    let mut correlations: Vec<Correlation> = factors
        .into_iter()
        .filter_map(|factor| evaluate_factor(entries, baseline, config, kind, factor))
        .collect();

    correlations.sort_by(|a, b| {
        b.delta_pain
            .abs()
            .total_cmp(&a.delta_pain.abs())
            .then_with(|| a.factor.cmp(&b.factor))
    });

    tracing::debug!(
        kind = kind.as_str(),
        reported = correlations.len(),
        "Factor correlation complete"
    );
    correlations
}

fn evaluate_factor(
    entries: &[PainEntry],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
    kind: FactorKind,
    factor: &str,
) -> Option<Correlation> {
    let (with, without): (Vec<&PainEntry>, Vec<&PainEntry>) = entries
        .iter()
        .partition(|e| e.factors(kind).contains(factor));

    if with.len() < config.min_support_for_correlation {
        return None;
    }

    let with_pain: Vec<f64> = with.iter().map(|e| e.pain_level).collect();
    let without_pain: Vec<f64> = without.iter().map(|e| e.pain_level).collect();

    let mean_with = mean(&with_pain);
    let mean_without = if without_pain.is_empty() {
        baseline.value
    } else {
        mean(&without_pain)
    };
    let delta = mean_with - mean_without;

    let above_baseline = with_pain.iter().filter(|p| **p > baseline.value).count();
    let confidence = above_baseline as f64 / with_pain.len() as f64;

    let strength = classify_strength(delta, confidence);
    if strength == CorrelationStrength::None {
        return None;
    }
    if confidence < config.min_confidence_for_display {
        return None;
    }

    Some(Correlation {
        kind,
        factor: factor.to_string(),
        delta_pain: round_to(delta, 2),
        mean_with: round_to(mean_with, 2),
        mean_without: round_to(mean_without, 2),
        support: with_pain.len(),
        without_count: without_pain.len(),
        confidence,
        stability: round_to(1.0 / (1.0 + variance(&with_pain)), 2),
        strength,
        direction: Direction::from_delta(delta),
        description: MessageTemplates::correlation(kind, factor, delta, with_pain.len()),
    })
}

/// Pairs of triggers recorded together in the same entry.
pub fn trigger_bundles(
    entries: &[PainEntry],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
) -> Vec<TriggerBundle> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut pairs: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for entry in entries {
        let triggers: Vec<&str> = entry.triggers.iter().map(String::as_str).collect();
        // BTreeSet order guarantees a < b for every pair.
        for (i, a) in triggers.iter().enumerate() {
            for b in &triggers[i + 1..] {
                pairs.entry((*a, *b)).or_default().push(entry.pain_level);
            }
        }
    }

    let min_count = MIN_BUNDLE_OCCURRENCES.max(config.min_support_for_correlation / 2);
    let total = entries.len() as f64;

    let mut bundles: Vec<TriggerBundle> = pairs
        .into_iter()
        .filter(|(_, pains)| pains.len() >= min_count)
        .filter_map(|((a, b), pains)| {
            let mean_pain = mean(&pains);
            let delta = mean_pain - baseline.value;
            let frequency = pains.len() as f64 / total;
            let strength = classify_strength(delta, frequency);
            if strength == CorrelationStrength::None {
                return None;
            }
            Some(TriggerBundle {
                triggers: [a.to_string(), b.to_string()],
                co_occurrences: pains.len(),
                mean_pain: round_to(mean_pain, 2),
                delta_pain: round_to(delta, 2),
                frequency: round_to(frequency, 3),
                strength,
                description: MessageTemplates::bundle(a, b, mean_pain, pains.len()),
            })
        })
        .collect();

    bundles.sort_by(|a, b| {
        b.delta_pain
            .abs()
            .total_cmp(&a.delta_pain.abs())
            .then_with(|| b.co_occurrences.cmp(&a.co_occurrences))
            .then_with(|| a.triggers.cmp(&b.triggers))
    });
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;
    use crate::patterns::test_support::{entry, entry_with, labels};

    fn baseline_at(value: f64) -> BaselineResult {
        BaselineResult {
            value,
            method: "median".into(),
            confidence: ConfidenceLevel::Medium,
            window_days: 30,
            entry_count: 20,
        }
    }

    fn stress_dataset() -> Vec<PainEntry> {
        let mut entries: Vec<PainEntry> = (0..10)
            .map(|d| entry_with(d, 7.0, |e| e.triggers = labels(&["stress"])))
            .collect();
        entries.extend((10..20).map(|d| entry(d, 3.0)));
        entries
    }

    #[test]
    fn strength_buckets() {
        assert_eq!(classify_strength(2.0, 0.4), CorrelationStrength::None);
        assert_eq!(classify_strength(0.29, 0.9), CorrelationStrength::None);
        assert_eq!(classify_strength(0.5, 0.9), CorrelationStrength::Weak);
        assert_eq!(classify_strength(-1.0, 0.9), CorrelationStrength::Moderate);
        assert_eq!(classify_strength(1.5, 0.5), CorrelationStrength::Strong);
    }

    #[test]
    fn stress_increases_pain() {
        let entries = stress_dataset();
        let result = correlate(&entries, &baseline_at(5.0), &AnalysisConfig::default(), FactorKind::Trigger);

        assert_eq!(result.len(), 1);
        let stress = &result[0];
        assert_eq!(stress.factor, "stress");
        assert_eq!(stress.direction, Direction::Increases);
        assert!(stress.delta_pain > 0.0);
        assert_eq!(stress.delta_pain, 4.0);
        assert_eq!(stress.support, 10);
        assert_eq!(stress.without_count, 10);
        assert_eq!(stress.confidence, 1.0);
        assert_eq!(stress.stability, 1.0);
        assert_eq!(stress.strength, CorrelationStrength::Strong);
    }

    #[test]
    fn low_support_factor_is_filtered() {
        let mut entries = stress_dataset();
        for e in entries.iter_mut().take(5) {
            e.triggers.insert("weather".into());
        }
        let config = AnalysisConfig::default();
        let result = correlate(&entries, &baseline_at(5.0), &config, FactorKind::Trigger);
        assert!(result.iter().all(|c| c.factor != "weather"));
        for c in &result {
            assert!(c.support >= config.min_support_for_correlation);
            assert!(c.confidence >= config.min_confidence_for_display);
        }
    }

    #[test]
    fn display_confidence_gate_is_independent_of_strength() {
        // 8 entries with "coffee": 5 above baseline (9), 3 at baseline-ish.
        let mut entries: Vec<PainEntry> = (0..5)
            .map(|d| entry_with(d, 9.0, |e| e.triggers = labels(&["coffee"])))
            .collect();
        entries.extend((5..8).map(|d| entry_with(d, 4.0, |e| e.triggers = labels(&["coffee"]))));
        entries.extend((8..20).map(|d| entry(d, 2.0)));

        // confidence = 5/8 = 0.625: strong at default gate 0.6 ...
        let shown = correlate(&entries, &baseline_at(4.0), &AnalysisConfig::default(), FactorKind::Trigger);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].strength, CorrelationStrength::Strong);

        // ... but hidden once the display gate is raised.
        let strict = AnalysisConfig {
            min_confidence_for_display: 0.7,
            ..AnalysisConfig::default()
        };
        assert!(correlate(&entries, &baseline_at(4.0), &strict, FactorKind::Trigger).is_empty());
    }

    #[test]
    fn without_sample_falls_back_to_baseline() {
        let entries: Vec<PainEntry> = (0..8)
            .map(|d| entry_with(d, 6.0, |e| e.locations = labels(&["lower back"])))
            .collect();
        let result = correlate(&entries, &baseline_at(4.0), &AnalysisConfig::default(), FactorKind::Location);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].mean_without, 4.0);
        assert_eq!(result[0].delta_pain, 2.0);
        assert_eq!(result[0].without_count, 0);
    }

    #[test]
    fn results_sorted_by_absolute_delta() {
        let mut entries: Vec<PainEntry> = (0..8)
            .map(|d| entry_with(d, 6.0, |e| e.symptoms = labels(&["stiffness"])))
            .collect();
        entries.extend((8..16).map(|d| entry_with(d, 9.0, |e| e.symptoms = labels(&["burning"]))));
        entries.extend((16..24).map(|d| entry(d, 2.0)));
        let result = correlate(&entries, &baseline_at(4.0), &AnalysisConfig::default(), FactorKind::Symptom);
        let names: Vec<&str> = result.iter().map(|c| c.factor.as_str()).collect();
        assert_eq!(names, vec!["burning", "stiffness"]);
    }

    #[test]
    fn pain_relieving_medication_is_not_surfaced_by_exceedance_confidence() {
        let mut entries: Vec<PainEntry> = (0..10)
            .map(|d| entry_with(d, 2.0, |e| e.medications = labels(&["ibuprofen"])))
            .collect();
        entries.extend((10..20).map(|d| entry(d, 7.0)));
        let result = correlate(&entries, &baseline_at(4.5), &AnalysisConfig::default(), FactorKind::Medication);
        assert!(result.is_empty());
    }

    #[test]
    fn bundles_need_co_occurrence_and_frequency() {
        let mut entries: Vec<PainEntry> = (0..6)
            .map(|d| entry_with(d, 8.0, |e| e.triggers = labels(&["stress", "poor sleep"])))
            .collect();
        entries.extend((6..8).map(|d| entry_with(d, 8.0, |e| e.triggers = labels(&["stress", "weather"]))));
        entries.extend((8..10).map(|d| entry(d, 2.0)));

        let bundles = trigger_bundles(&entries, &baseline_at(3.0), &AnalysisConfig::default());
        assert_eq!(bundles.len(), 1);
        let bundle = &bundles[0];
        assert_eq!(bundle.triggers, ["poor sleep".to_string(), "stress".to_string()]);
        assert_eq!(bundle.co_occurrences, 6);
        assert_eq!(bundle.mean_pain, 8.0);
        assert_eq!(bundle.delta_pain, 5.0);
        assert_eq!(bundle.frequency, 0.6);
        assert_eq!(bundle.strength, CorrelationStrength::Strong);
    }

    #[test]
    fn infrequent_bundle_has_no_strength() {
        // 4 co-occurrences out of 20 entries: frequency 0.2 < 0.5.
        let mut entries: Vec<PainEntry> = (0..4)
            .map(|d| entry_with(d, 9.0, |e| e.triggers = labels(&["heat", "stairs"])))
            .collect();
        entries.extend((4..20).map(|d| entry(d, 2.0)));
        assert!(trigger_bundles(&entries, &baseline_at(2.0), &AnalysisConfig::default()).is_empty());
    }
}
