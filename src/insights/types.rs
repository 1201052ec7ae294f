use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DataQuality, EffectivenessRating, IndicatorKind, PainTrend};
use crate::patterns::{Correlation, PainEpisode, QolDissonance, QolPattern};

/// How well one medication or relief method goes with lower pain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionEffect {
    pub intervention: String,
    pub uses: usize,
    pub mean_pain_with: f64,
    pub mean_pain_without: f64,
    /// mean(without) − mean(with); positive means less pain when used.
    pub pain_reduction: f64,
    /// Mean drop from an entry using the intervention to the next entry
    /// within 24h. `None` when no follow-up entry exists.
    pub follow_up_relief: Option<f64>,
    pub follow_up_samples: usize,
    /// 0–100, relative reduction against the without-mean.
    pub effectiveness_score: f64,
    pub rating: EffectivenessRating,
}

/// An early signal that pain may rise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveIndicator {
    pub kind: IndicatorKind,
    pub signal_date: NaiveDate,
    /// Slope, spike value or correlation delta, depending on `kind`.
    pub value: f64,
    /// 0..=1.
    pub confidence: f64,
    pub description: String,
}

/// One-week clinical summary for a visit or a weekly check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalBrief {
    pub id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub entry_count: usize,
    pub avg_pain: f64,
    pub previous_avg_pain: Option<f64>,
    pub pain_change: Option<f64>,
    pub pain_trend: PainTrend,
    pub episodes_this_week: usize,
    pub open_episodes: Vec<PainEpisode>,
    pub top_triggers: Vec<Correlation>,
    pub qol_highlights: Vec<QolPattern>,
    pub dissonances: Vec<QolDissonance>,
    pub interventions: Vec<InterventionEffect>,
    pub indicators: Vec<PredictiveIndicator>,
    pub data_quality: DataQuality,
    pub highlights: Vec<String>,
    pub cautions: Vec<String>,
}
