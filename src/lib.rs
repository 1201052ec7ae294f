pub mod config;
pub mod insights; // Interventions, early warnings, weekly brief
pub mod models;
pub mod patterns; // Cleaning → baseline → trends → findings
pub mod stats;

use tracing_subscriber::EnvFilter;

pub use config::{AnalysisConfig, ConfigOverrides};
pub use insights::{weekly_brief, ClinicalBrief};
pub use models::{parse_entries_json, PainEntry, RawPainEntry};
pub use patterns::{analyze, analyze_with_overrides, AnalysisResult, PatternEngine};

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let initialized = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("{} v{} tracing ready", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_tolerates_repeat_calls() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn json_journal_to_brief() {
        let json = r#"[
            {"id": "a", "timestamp": "2025-03-01T09:00:00+01:00", "painLevel": 4},
            {"id": "b", "timestamp": "2025-03-02T09:00:00+01:00", "intensity": 6, "triggers": ["stress"]},
            {"id": "c", "timestamp": "not a date", "painLevel": 5}
        ]"#;
        let raw = parse_entries_json(json).unwrap();
        let config = AnalysisConfig {
            analysis_time: Some("2025-03-02T12:00:00Z".parse().unwrap()),
            ..AnalysisConfig::default()
        };
        let result = analyze(&raw, &config);
        assert_eq!(result.metadata.entry_count, 2);
        assert_eq!(result.metadata.excluded_count, 1);

        let brief = weekly_brief(&result, config.now());
        assert_eq!(brief.entry_count, 2);
        assert_eq!(brief.avg_pain, 5.0);
    }
}
