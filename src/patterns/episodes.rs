use crate::config::AnalysisConfig;
use crate::models::EpisodeSeverity;
use crate::stats::{mean, round_to};

use super::types::{BaselineResult, PainEpisode, TrendPoint};

/// Points above the patient's own baseline before a day counts as a flare day.
const BASELINE_MARGIN: f64 = 2.0;

/// Flare threshold: the configured floor or baseline + 2, whichever is higher.
pub fn episode_threshold(baseline: &BaselineResult, config: &AnalysisConfig) -> f64 {
    config
        .episode_pain_threshold
        .max(baseline.value + BASELINE_MARGIN)
}

/// Find sustained runs of daily means at or above the flare threshold.
///
/// Runs shorter than `episode_min_length_days` are single-day noise and are
/// dropped. A run still open on the last tracked day is reported with
/// `ongoing = true` and no recovery.
pub fn detect_episodes(
    daily: &[TrendPoint],
    baseline: &BaselineResult,
    config: &AnalysisConfig,
) -> Vec<PainEpisode> {
    let threshold = episode_threshold(baseline, config);
    let min_len = config.episode_min_length_days.max(1);
    let mut episodes = Vec::new();

    let mut i = 0;
    while i < daily.len() {
        if daily[i].value < threshold {
            i += 1;
            continue;
        }
        let start = i;
        while i < daily.len() && daily[i].value >= threshold {
            i += 1;
        }
        // daily[start..i] is a maximal run.
        let run = &daily[start..i];
        if run.len() >= min_len {
            episodes.push(build_episode(daily, start, i, threshold, baseline.value));
        } else {
            tracing::trace!(
                start = %run[0].date,
                days = run.len(),
                "High-pain run too short for an episode"
            );
        }
    }

    episodes
}

fn build_episode(
    daily: &[TrendPoint],
    start: usize,
    end: usize,
    threshold: f64,
    baseline_value: f64,
) -> PainEpisode {
    let run = &daily[start..end];
    let values: Vec<f64> = run.iter().map(|p| p.value).collect();
    let peak = values.iter().copied().fold(f64::MIN, f64::max);
    let peak_pain = peak.round().min(10.0);
    let start_date = run[0].date;
    let end_date = run[run.len() - 1].date;

    let ongoing = end == daily.len();
    let recovery_days = daily[end..]
        .iter()
        .find(|p| p.value < baseline_value)
        .map(|p| (p.date - end_date).num_days());

    PainEpisode {
        id: format!("episode-{start_date}"),
        start_date,
        end_date,
        duration_days: run.len(),
        peak_pain,
        avg_pain: round_to(mean(&values), 1),
        severity: EpisodeSeverity::from_peak(peak_pain),
        threshold,
        recovery_days,
        ongoing,
    }
}
