//! Analysis configuration: documented defaults, partial overrides, and
//! clamping of malformed values.
//!
//! Callers may override any subset of options. Values that make no sense
//! (negative windows, confidence above 1, NaN thresholds) are clamped to the
//! nearest usable value instead of failing the analysis.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Painscope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "painscope_lib=info,warn"
}

const MAX_LAG_DAYS_CAP: usize = 14;
/// A century of history; longer windows are clamped to this.
const MAX_BASELINE_WINDOW_DAYS: usize = 36_500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Effective configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Below this many entries trends are low-confidence and a caution is emitted.
    pub min_entries_for_trend: usize,
    /// Minimum "with" sample size before a correlation or QoL pattern is reported.
    pub min_support_for_correlation: usize,
    /// Minimum evidential-consistency fraction for a correlation to surface.
    pub min_confidence_for_display: f64,
    /// Absolute floor for the flare threshold (combined with baseline + 2).
    pub episode_pain_threshold: f64,
    /// Minimum consecutive high-pain days for a flare.
    pub episode_min_length_days: usize,
    /// Recency window for the baseline, in days.
    pub baseline_window_days: usize,
    pub enable_lagged_correlations: bool,
    pub max_lag_days: usize,
    pub enable_qol_dissonance: bool,
    /// Reference "now". `None` uses the wall clock.
    pub analysis_time: Option<DateTime<Utc>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_entries_for_trend: 7,
            min_support_for_correlation: 8,
            min_confidence_for_display: 0.6,
            episode_pain_threshold: 6.0,
            episode_min_length_days: 2,
            baseline_window_days: 30,
            enable_lagged_correlations: false,
            max_lag_days: 3,
            enable_qol_dissonance: true,
            analysis_time: None,
        }
    }
}

/// A partial configuration. Integer fields are signed so that malformed
/// values (e.g. a negative window) can be read and then clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub min_entries_for_trend: Option<i64>,
    pub min_support_for_correlation: Option<i64>,
    pub min_confidence_for_display: Option<f64>,
    pub episode_pain_threshold: Option<f64>,
    pub episode_min_length_days: Option<i64>,
    pub baseline_window_days: Option<i64>,
    pub enable_lagged_correlations: Option<bool>,
    pub max_lag_days: Option<i64>,
    pub enable_qol_dissonance: Option<bool>,
    pub analysis_time: Option<DateTime<Utc>>,
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl ConfigOverrides {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

// ═══════════════════════════════════════════════════════════
// Merging & clamping
// ═══════════════════════════════════════════════════════════

fn at_least_one(value: i64) -> usize {
    value.max(1) as usize
}

impl AnalysisConfig {
    /// Overlay `overrides` on the documented defaults.
    pub fn merged(overrides: &ConfigOverrides) -> Self {
        Self::default().with_overrides(overrides)
    }

    /// Overlay `overrides` on this configuration, then clamp.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();
        if let Some(v) = overrides.min_entries_for_trend {
            config.min_entries_for_trend = at_least_one(v);
        }
        if let Some(v) = overrides.min_support_for_correlation {
            config.min_support_for_correlation = at_least_one(v);
        }
        if let Some(v) = overrides.min_confidence_for_display {
            config.min_confidence_for_display = v;
        }
        if let Some(v) = overrides.episode_pain_threshold {
            config.episode_pain_threshold = v;
        }
        if let Some(v) = overrides.episode_min_length_days {
            config.episode_min_length_days = at_least_one(v);
        }
        if let Some(v) = overrides.baseline_window_days {
            config.baseline_window_days = at_least_one(v);
        }
        if let Some(v) = overrides.enable_lagged_correlations {
            config.enable_lagged_correlations = v;
        }
        if let Some(v) = overrides.max_lag_days {
            config.max_lag_days = at_least_one(v);
        }
        if let Some(v) = overrides.enable_qol_dissonance {
            config.enable_qol_dissonance = v;
        }
        if overrides.analysis_time.is_some() {
            config.analysis_time = overrides.analysis_time;
        }
        config.sanitized()
    }

    /// Clamp every option into its usable range.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        config.min_entries_for_trend = config.min_entries_for_trend.max(1);
        config.min_support_for_correlation = config.min_support_for_correlation.max(1);
        config.episode_min_length_days = config.episode_min_length_days.max(1);
        config.baseline_window_days = config
            .baseline_window_days
            .clamp(1, MAX_BASELINE_WINDOW_DAYS);
        config.max_lag_days = config.max_lag_days.clamp(1, MAX_LAG_DAYS_CAP);

        config.min_confidence_for_display = if config.min_confidence_for_display.is_finite() {
            config.min_confidence_for_display.clamp(0.0, 1.0)
        } else {
            defaults.min_confidence_for_display
        };
        config.episode_pain_threshold = if config.episode_pain_threshold.is_finite() {
            config.episode_pain_threshold.clamp(0.0, 10.0)
        } else {
            defaults.episode_pain_threshold
        };

        config
    }

    /// The reference instant for windowed computations.
    pub fn now(&self) -> DateTime<Utc> {
        self.analysis_time.unwrap_or_else(Utc::now)
    }
}
