use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::models::{
    ConfidenceLevel, CorrelationStrength, DataQuality, Direction, DissonanceSeverity,
    DissonanceType, EpisodeSeverity, FactorKind, PainEntry, PainTrend, QolDimension,
};

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MissingPain,
    NonFinitePain,
    PainOutOfRange,
    InvalidTimestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedEntry {
    /// Position in the raw input.
    pub index: usize,
    pub id: Option<String>,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// Valid entries, ascending by timestamp.
    pub entries: Vec<PainEntry>,
    pub excluded: Vec<ExcludedEntry>,
}

// ---------------------------------------------------------------------------
// Baseline & trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineResult {
    pub value: f64,
    pub method: String,
    pub confidence: ConfidenceLevel,
    pub window_days: usize,
    pub entry_count: usize,
}

/// One day (or one trailing week) of aggregated pain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// The day, or for weekly points the last day of the window.
    pub date: NaiveDate,
    pub value: f64,
    pub sample_count: usize,
    /// `[min, max]`.
    pub range: (f64, f64),
    pub std_dev: Option<f64>,
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainEpisode {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Number of tracked days in the run.
    pub duration_days: usize,
    pub peak_pain: f64,
    pub avg_pain: f64,
    pub severity: EpisodeSeverity,
    /// Threshold the run was measured against.
    pub threshold: f64,
    /// Days from the episode's last day to the first day below baseline.
    /// `None` while recovery has not been observed.
    pub recovery_days: Option<i64>,
    /// The run was still above threshold on the last tracked day.
    pub ongoing: bool,
}

// ---------------------------------------------------------------------------
// Correlations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub kind: FactorKind,
    pub factor: String,
    pub delta_pain: f64,
    pub mean_with: f64,
    pub mean_without: f64,
    /// Size of the "with" sample.
    pub support: usize,
    pub without_count: usize,
    /// Fraction of "with" samples above baseline.
    pub confidence: f64,
    /// 1 / (1 + variance of the "with" sample).
    pub stability: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBundle {
    /// The two triggers, in lexicographic order.
    pub triggers: [String; 2],
    pub co_occurrences: usize,
    pub mean_pain: f64,
    /// Mean pain during co-occurrence minus baseline.
    pub delta_pain: f64,
    /// Co-occurrences / total entries.
    pub frequency: f64,
    pub strength: CorrelationStrength,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Quality of life
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QolPattern {
    pub dimension: QolDimension,
    /// mean(good) − mean(poor).
    pub delta: f64,
    pub good_mean: f64,
    pub poor_mean: f64,
    pub good_count: usize,
    pub poor_count: usize,
    pub confidence: ConfidenceLevel,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    /// Threshold condition that defines the "poor" bucket, e.g. `sleepQuality <= 4`.
    pub condition: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QolDissonance {
    pub dissonance_type: DissonanceType,
    pub severity: DissonanceSeverity,
    pub metric: QolDimension,
    pub pain_trend: PainTrend,
    /// Recent-window mean minus prior-window mean.
    pub pain_change: f64,
    pub metric_change: f64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub description: String,
    /// Description of the matching QoL pattern, when one exists.
    pub related_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaggedCorrelation {
    pub dimension: QolDimension,
    pub lag_days: usize,
    pub coefficient: f64,
    pub sample_pairs: usize,
    pub strength: CorrelationStrength,
    pub direction: Direction,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Result bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainSummary {
    pub avg_pain_level: f64,
    pub median_pain_level: f64,
    pub min_pain: f64,
    pub max_pain: f64,
    pub std_dev: f64,
    pub most_common_location: Option<String>,
    pub most_common_trigger: Option<String>,
    pub days_tracked: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub data_window: Option<DataWindow>,
    pub entry_count: usize,
    pub excluded_count: usize,
    pub data_quality: DataQuality,
    pub trend_confidence: ConfidenceLevel,
    pub cautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub entries: Vec<PainEntry>,
    pub baseline: BaselineResult,
    pub summary: PainSummary,
    pub daily_trend: Vec<TrendPoint>,
    pub weekly_trend: Vec<TrendPoint>,
    pub episodes: Vec<PainEpisode>,
    pub trigger_correlations: Vec<Correlation>,
    pub symptom_correlations: Vec<Correlation>,
    pub medication_correlations: Vec<Correlation>,
    pub location_correlations: Vec<Correlation>,
    pub trigger_bundles: Vec<TriggerBundle>,
    pub qol_patterns: Vec<QolPattern>,
    pub qol_dissonances: Vec<QolDissonance>,
    pub lagged_correlations: Vec<LaggedCorrelation>,
    pub metadata: AnalysisMetadata,
    pub config: AnalysisConfig,
}

impl AnalysisResult {
    pub fn correlations(&self, kind: FactorKind) -> &[Correlation] {
        match kind {
            FactorKind::Trigger => &self.trigger_correlations,
            FactorKind::Symptom => &self.symptom_correlations,
            FactorKind::Medication => &self.medication_correlations,
            FactorKind::Location => &self.location_correlations,
        }
    }
}
