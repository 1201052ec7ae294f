use crate::models::{FactorKind, QolDimension};

/// Message template builder for findings and cautions.
/// Plain wording, no alarm language; every finding names the evidence behind it.
pub struct MessageTemplates;

impl MessageTemplates {
    /// Correlation finding.
    pub fn correlation(kind: FactorKind, factor: &str, delta: f64, support: usize) -> String {
        let noun = match kind {
            FactorKind::Trigger => "the trigger",
            FactorKind::Symptom => "the symptom",
            FactorKind::Medication => "the medication",
            FactorKind::Location => "the location",
        };
        format!(
            "Entries with {} {} average {:.1} points {} pain than entries without it ({} entries).",
            noun,
            factor,
            delta.abs(),
            Self::comparative(delta),
            support,
        )
    }

    /// Co-occurring trigger pair.
    pub fn bundle(a: &str, b: &str, mean_pain: f64, count: usize) -> String {
        format!(
            "{} and {} were recorded together {} times, with an average pain of {:.1}.",
            a, b, count, mean_pain,
        )
    }

    /// QoL pattern finding.
    pub fn qol_pattern(dimension: QolDimension, poor_condition: &str, delta: f64) -> String {
        // delta is good − poor, so a negative delta means more pain when poor.
        format!(
            "Pain averages {:.1} points {} when {} is poor ({}).",
            delta.abs(),
            Self::comparative(-delta),
            dimension.label(),
            poor_condition,
        )
    }

    /// Sleep dropped while pain held steady.
    pub fn sleep_decline_pain_stable(drop: f64) -> String {
        format!(
            "Sleep quality dropped by {:.1} points this week while pain stayed about the same. \
             Poor sleep often shows up in pain later, so this may be worth watching.",
            drop,
        )
    }

    /// Lagged QoL → pain relationship.
    pub fn lagged(dimension: QolDimension, lag_days: usize, coefficient: f64) -> String {
        let tendency = if coefficient < 0.0 {
            "lower"
        } else {
            "higher"
        };
        format!(
            "Higher {} tends to be followed by {} pain {} day(s) later (r = {:.2}).",
            dimension.label(),
            tendency,
            lag_days,
            coefficient,
        )
    }

    fn comparative(delta: f64) -> &'static str {
        if delta < 0.0 {
            "lower"
        } else {
            "higher"
        }
    }

    // ── Cautions ──────────────────────────────────────────

    pub fn caution_low_sample(count: usize, minimum: usize) -> String {
        format!(
            "Only {} entries available; at least {} are needed for reliable trends.",
            count, minimum,
        )
    }

    pub fn caution_low_correlation_evidence(count: usize, minimum: usize) -> String {
        format!(
            "Limited evidence for correlations: {} entries recorded, {} needed per factor.",
            count, minimum,
        )
    }

    pub fn caution_qol_missing() -> String {
        "Quality of Life data missing: add sleep, mood, or activity ratings to see how they relate to pain."
            .to_string()
    }

    pub fn caution_excluded(count: usize) -> String {
        format!(
            "{} entries were excluded because of an invalid pain level or timestamp.",
            count,
        )
    }

    pub fn caution_low_baseline(count: usize) -> String {
        format!(
            "Your baseline pain level is estimated from only {} entries and may shift as you log more.",
            count,
        )
    }
}
