use std::time::Instant;

use crate::config::{AnalysisConfig, ConfigOverrides};
use crate::models::{ConfidenceLevel, DataQuality, FactorKind, PainEntry, RawPainEntry};
use crate::stats::{mean, median, mode, round_to, std_dev};

use super::baseline::baseline;
use super::cleaner::clean_with_report;
use super::correlation::{correlate, trigger_bundles};
use super::episodes::detect_episodes;
use super::lagged::lagged_correlations;
use super::messages::MessageTemplates;
use super::qol::{qol_dissonances, qol_patterns};
use super::trend::{daily_trend, weekly_trend};
use super::types::*;

const HIGH_QUALITY_ENTRIES: usize = 60;

/// Stateless pattern engine bound to one configuration.
///
/// Holds nothing but the (sanitized) config; concurrent callers can share
/// one instance or build their own.
#[derive(Debug, Clone, Default)]
pub struct PatternEngine {
    config: AnalysisConfig,
}

impl PatternEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn with_overrides(overrides: &ConfigOverrides) -> Self {
        Self {
            config: AnalysisConfig::merged(overrides),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, raw_entries: &[RawPainEntry]) -> AnalysisResult {
        analyze(raw_entries, &self.config)
    }
}

/// Run the full pipeline over raw entries.
///
/// Never fails: invalid entries are dropped and insufficient data yields
/// empty sections plus cautions in the metadata.
pub fn analyze(raw_entries: &[RawPainEntry], config: &AnalysisConfig) -> AnalysisResult {
    let start = Instant::now();
    let config = config.sanitized();

    let report = clean_with_report(raw_entries);
    let excluded_count = report.excluded.len();
    let entries = report.entries;

    let baseline = baseline(&entries, config.baseline_window_days, config.now());
    let daily = daily_trend(&entries);
    let weekly = weekly_trend(&daily);

    // Independent stages: each reads entries/trend/baseline only.
    let episodes = detect_episodes(&daily, &baseline, &config);
    let [trigger_correlations, symptom_correlations, medication_correlations, location_correlations] =
        FactorKind::ALL.map(|kind| correlate(&entries, &baseline, &config, kind));
    let bundles = trigger_bundles(&entries, &baseline, &config);
    let qol = qol_patterns(&entries, &baseline, &config);
    let dissonances = if config.enable_qol_dissonance {
        qol_dissonances(&entries, &daily, &qol)
    } else {
        Vec::new()
    };
    let lagged = lagged_correlations(&entries, &daily, &config);

    let metadata = build_metadata(&entries, excluded_count, &baseline, &config);
    let summary = summarize(&entries, &daily);

    tracing::info!(
        entry_count = entries.len(),
        excluded = excluded_count,
        episodes = episodes.len(),
        correlations = trigger_correlations.len()
            + symptom_correlations.len()
            + medication_correlations.len()
            + location_correlations.len(),
        qol_patterns = qol.len(),
        processing_ms = start.elapsed().as_millis() as u64,
        "Pattern analysis complete"
    );

    AnalysisResult {
        entries,
        baseline,
        summary,
        daily_trend: daily,
        weekly_trend: weekly,
        episodes,
        trigger_correlations,
        symptom_correlations,
        medication_correlations,
        location_correlations,
        trigger_bundles: bundles,
        qol_patterns: qol,
        qol_dissonances: dissonances,
        lagged_correlations: lagged,
        metadata,
        config,
    }
}

/// Merge `overrides` over the defaults, then analyze.
pub fn analyze_with_overrides(
    raw_entries: &[RawPainEntry],
    overrides: &ConfigOverrides,
) -> AnalysisResult {
    analyze(raw_entries, &AnalysisConfig::merged(overrides))
}

pub fn data_quality(entry_count: usize, config: &AnalysisConfig) -> DataQuality {
    if entry_count >= HIGH_QUALITY_ENTRIES {
        DataQuality::High
    } else if entry_count >= 3 * config.min_entries_for_trend {
        DataQuality::Medium
    } else {
        DataQuality::Low
    }
}

pub fn trend_confidence(entry_count: usize, config: &AnalysisConfig) -> ConfidenceLevel {
    ConfidenceLevel::from_count(
        entry_count,
        config.min_entries_for_trend,
        3 * config.min_entries_for_trend,
    )
}

fn build_metadata(
    entries: &[PainEntry],
    excluded_count: usize,
    baseline: &BaselineResult,
    config: &AnalysisConfig,
) -> AnalysisMetadata {
    let count = entries.len();
    let mut cautions = Vec::new();

    if excluded_count > 0 {
        cautions.push(MessageTemplates::caution_excluded(excluded_count));
    }
    if count < config.min_entries_for_trend {
        cautions.push(MessageTemplates::caution_low_sample(
            count,
            config.min_entries_for_trend,
        ));
    }
    if count < config.min_support_for_correlation {
        cautions.push(MessageTemplates::caution_low_correlation_evidence(
            count,
            config.min_support_for_correlation,
        ));
    }
    if !entries.iter().any(PainEntry::has_any_qol) {
        cautions.push(MessageTemplates::caution_qol_missing());
    }
    if count > 0 && baseline.confidence == ConfidenceLevel::Low {
        cautions.push(MessageTemplates::caution_low_baseline(baseline.entry_count));
    }

    AnalysisMetadata {
        data_window: match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => Some(DataWindow {
                start: first.timestamp,
                end: last.timestamp,
            }),
            _ => None,
        },
        entry_count: count,
        excluded_count,
        data_quality: data_quality(count, config),
        trend_confidence: trend_confidence(count, config),
        cautions,
    }
}

/// Headline aggregates. All zero for an empty journal.
pub fn summarize(entries: &[PainEntry], daily: &[TrendPoint]) -> PainSummary {
    let pains: Vec<f64> = entries.iter().map(|e| e.pain_level).collect();
    if pains.is_empty() {
        return PainSummary::default();
    }

    PainSummary {
        avg_pain_level: round_to(mean(&pains), 2),
        median_pain_level: median(&pains),
        min_pain: pains.iter().copied().fold(f64::INFINITY, f64::min),
        max_pain: pains.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std_dev: round_to(std_dev(&pains), 2),
        most_common_location: mode(entries.iter().flat_map(|e| e.locations.iter())),
        most_common_trigger: mode(entries.iter().flat_map(|e| e.triggers.iter())),
        days_tracked: daily.len(),
    }
}
