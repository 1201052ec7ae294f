use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::config::AnalysisConfig;
use crate::models::{CorrelationStrength, Direction, PainEntry, QolDimension};
use crate::stats::{mean, pearson, round_to};

use super::messages::MessageTemplates;
use super::types::{LaggedCorrelation, TrendPoint};

/// |r| below this is not reported.
const MIN_ABS_COEFFICIENT: f64 = 0.3;

fn coefficient_strength(r: f64) -> CorrelationStrength {
    let magnitude = r.abs();
    if magnitude < MIN_ABS_COEFFICIENT {
        CorrelationStrength::None
    } else if magnitude < 0.5 {
        CorrelationStrength::Weak
    } else if magnitude < 0.7 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    }
}

/// Delayed effects: a QoL value on day d against daily pain on day d + lag,
/// for lag in 1..=`max_lag_days`. Empty unless enabled in the config.
pub fn lagged_correlations(
    entries: &[PainEntry],
    daily: &[TrendPoint],
    config: &AnalysisConfig,
) -> Vec<LaggedCorrelation> {
    if !config.enable_lagged_correlations {
        return Vec::new();
    }

    let pain_by_day: BTreeMap<NaiveDate, f64> = daily.iter().map(|p| (p.date, p.value)).collect();
    let mut found = Vec::new();

    for dimension in QolDimension::ALL {
        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for entry in entries {
            if let Some(value) = entry.qol(dimension) {
                by_day.entry(entry.date()).or_default().push(value);
            }
        }
        let qol_by_day: Vec<(NaiveDate, f64)> =
            by_day.into_iter().map(|(d, vs)| (d, mean(&vs))).collect();

        for lag in 1..=config.max_lag_days {
            let (xs, ys): (Vec<f64>, Vec<f64>) = qol_by_day
                .iter()
                .filter_map(|(day, value)| {
                    let later = day.checked_add_signed(Duration::days(lag as i64))?;
                    pain_by_day.get(&later).map(|pain| (*value, *pain))
                })
                .unzip();

            if xs.len() < config.min_support_for_correlation {
                continue;
            }
            let Some(r) = pearson(&xs, &ys) else {
                continue;
            };
            let strength = coefficient_strength(r);
            if strength == CorrelationStrength::None {
                continue;
            }

            found.push(LaggedCorrelation {
                dimension,
                lag_days: lag,
                coefficient: round_to(r, 3),
                sample_pairs: xs.len(),
                strength,
                direction: if r > 0.0 {
                    Direction::Increases
                } else {
                    Direction::Decreases
                },
                description: MessageTemplates::lagged(dimension, lag, r),
            });
        }
    }

    found
}
