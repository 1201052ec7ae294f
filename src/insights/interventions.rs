use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;

use crate::models::{EffectivenessRating, PainEntry};
use crate::patterns::BaselineResult;
use crate::stats::{mean, round_to};

use super::types::InterventionEffect;

/// Fewer uses than this are not rated.
pub const MIN_INTERVENTION_USES: usize = 3;

/// Relative reduction (percent of the without-mean) for each rating.
const EFFECTIVE_PERCENT: f64 = 20.0;
const PARTIAL_PERCENT: f64 = 5.0;

fn rating(score: f64) -> EffectivenessRating {
    if score >= EFFECTIVE_PERCENT {
        EffectivenessRating::Effective
    } else if score >= PARTIAL_PERCENT {
        EffectivenessRating::Partial
    } else {
        EffectivenessRating::Ineffective
    }
}

/// Rate each medication / relief method used at least
/// [`MIN_INTERVENTION_USES`] times. `entries` must be sorted by timestamp.
///
/// When no entry lacks the intervention, the baseline stands in for the
/// without-mean. Sorted by score, best first.
pub fn intervention_effectiveness(
    entries: &[PainEntry],
    baseline: &BaselineResult,
) -> Vec<InterventionEffect> {
    let names: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.medications.iter().map(String::as_str))
        .collect();

    let mut relief: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for pair in entries.windows(2) {
        let (taken, next) = (&pair[0], &pair[1]);
        if next.timestamp - taken.timestamp > Duration::hours(24) {
            continue;
        }
        for name in &taken.medications {
            relief
                .entry(name.as_str())
                .or_default()
                .push(taken.pain_level - next.pain_level);
        }
    }

    let mut effects: Vec<InterventionEffect> = names
        .into_iter()
        .filter_map(|name| {
            let (with, without): (Vec<&PainEntry>, Vec<&PainEntry>) =
                entries.iter().partition(|e| e.medications.contains(name));
            if with.len() < MIN_INTERVENTION_USES {
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
            let reduction = mean_without - mean_with;
            let score = (reduction / mean_without.max(1.0) * 100.0).clamp(0.0, 100.0);

            let drops = relief.get(name).map(Vec::as_slice).unwrap_or_default();
            let follow_up_relief = (!drops.is_empty()).then(|| round_to(mean(drops), 2));

            Some(InterventionEffect {
                intervention: name.to_string(),
                uses: with.len(),
                mean_pain_with: round_to(mean_with, 2),
                mean_pain_without: round_to(mean_without, 2),
                pain_reduction: round_to(reduction, 2),
                follow_up_relief,
                follow_up_samples: drops.len(),
                effectiveness_score: round_to(score, 1),
                rating: rating(score),
            })
        })
        .collect();

    effects.sort_by(|a, b| {
        b.effectiveness_score
            .total_cmp(&a.effectiveness_score)
            .then_with(|| a.intervention.cmp(&b.intervention))
    });

    tracing::debug!(rated = effects.len(), "Intervention effectiveness computed");
    effects
}
