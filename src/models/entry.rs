use std::collections::BTreeSet;

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::enums::{FactorKind, QolDimension};

pub const PAIN_MIN: f64 = 0.0;
pub const PAIN_MAX: f64 = 10.0;

/// Calendar years a journal timestamp may fall in. Anything outside is
/// treated as unparseable, which keeps day arithmetic far from chrono's limits.
pub const TIMESTAMP_YEARS: RangeInclusive<i32> = 1900..=2200;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Entry export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════
// Raw records, as handed over by storage
// ═══════════════════════════════════════════

/// Quality-of-life sub-record as stored. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQualityOfLife {
    #[serde(default, deserialize_with = "lenient_number")]
    pub sleep_quality: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub mood_impact: Option<f64>,
}

/// One journal record exactly as the storage layer hands it over.
///
/// Two historical shapes exist: newer records carry `painLevel`, older ones
/// `intensity`. Both are accepted here and resolved by [`canonical_pain`];
/// nothing past the cleaner sees the alias.
///
/// [`canonical_pain`]: RawPainEntry::canonical_pain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPainEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// RFC 3339 string, naive date-time, plain date, or epoch milliseconds.
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pain_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub relief_methods: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub quality_of_life: Option<RawQualityOfLife>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub activity_level: Option<f64>,
}

impl RawPainEntry {
    pub fn new(id: &str, timestamp: &str, pain_level: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            timestamp: Value::String(timestamp.to_string()),
            pain_level: Some(pain_level),
            ..Self::default()
        }
    }

    pub fn with_triggers(mut self, triggers: &[&str]) -> Self {
        self.triggers = triggers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_symptoms(mut self, symptoms: &[&str]) -> Self {
        self.symptoms = symptoms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_locations(mut self, locations: &[&str]) -> Self {
        self.locations = locations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_medications(mut self, medications: &[&str]) -> Self {
        self.medications = medications.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_sleep(mut self, sleep: f64) -> Self {
        self.quality_of_life
            .get_or_insert_with(RawQualityOfLife::default)
            .sleep_quality = Some(sleep);
        self
    }

    pub fn with_mood(mut self, mood: f64) -> Self {
        self.quality_of_life
            .get_or_insert_with(RawQualityOfLife::default)
            .mood_impact = Some(mood);
        self
    }

    pub fn with_activity(mut self, activity: f64) -> Self {
        self.activity_level = Some(activity);
        self
    }

    /// `painLevel` wins over the legacy `intensity` field.
    pub fn canonical_pain(&self) -> Option<f64> {
        self.pain_level.or(self.intensity)
    }
}

/// Parse a JSON array of raw entries (e.g. an exported journal).
pub fn parse_entries_json(json: &str) -> Result<Vec<RawPainEntry>, IngestError> {
    Ok(serde_json::from_str(json)?)
}

// ═══════════════════════════════════════════
// Canonical record the engine works on
// ═══════════════════════════════════════════

/// A validated journal entry. Pain is within [0, 10] and the timestamp is a
/// real instant; the cleaner is the only producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainEntry {
    pub id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub pain_level: f64,
    pub locations: BTreeSet<String>,
    pub symptoms: BTreeSet<String>,
    pub triggers: BTreeSet<String>,
    /// Medications and any other relief methods applied.
    pub medications: BTreeSet<String>,
    pub sleep_quality: Option<f64>,
    pub mood_impact: Option<f64>,
    pub activity_level: Option<f64>,
}

impl PainEntry {
    /// Calendar day in the recorder's own offset.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn factors(&self, kind: FactorKind) -> &BTreeSet<String> {
        match kind {
            FactorKind::Trigger => &self.triggers,
            FactorKind::Symptom => &self.symptoms,
            FactorKind::Medication => &self.medications,
            FactorKind::Location => &self.locations,
        }
    }

    pub fn qol(&self, dimension: QolDimension) -> Option<f64> {
        match dimension {
            QolDimension::Sleep => self.sleep_quality,
            QolDimension::Mood => self.mood_impact,
            QolDimension::Activity => self.activity_level,
        }
    }

    pub fn has_any_qol(&self) -> bool {
        QolDimension::ALL.iter().any(|d| self.qol(*d).is_some())
    }
}

/// Build the canonical entry once pain and timestamp have been validated.
pub(crate) fn canonicalize(
    raw: &RawPainEntry,
    index: usize,
    timestamp: DateTime<FixedOffset>,
    pain_level: f64,
) -> PainEntry {
    let qol = raw.quality_of_life.as_ref();
    PainEntry {
        id: raw
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("entry-{index}")),
        timestamp,
        pain_level,
        locations: label_set(&raw.locations),
        symptoms: label_set(&raw.symptoms),
        triggers: label_set(&raw.triggers),
        medications: label_set(raw.medications.iter().chain(&raw.relief_methods)),
        sleep_quality: in_scale(qol.and_then(|q| q.sleep_quality), 0.0, 10.0),
        mood_impact: in_scale(qol.and_then(|q| q.mood_impact), -5.0, 5.0),
        activity_level: in_scale(raw.activity_level, 0.0, 10.0),
    }
}

fn label_set<'a>(labels: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    labels
        .into_iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn in_scale(value: Option<f64>, low: f64, high: f64) -> Option<f64> {
    value.filter(|v| v.is_finite() && (low..=high).contains(v))
}

// ═══════════════════════════════════════════
// Timestamp parsing
// ═══════════════════════════════════════════

/// Parse any of the accepted timestamp shapes. Anything else, or a date
/// outside [`TIMESTAMP_YEARS`], is `None`, never a panic.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    parse_timestamp_value(value).filter(|ts| TIMESTAMP_YEARS.contains(&ts.year()))
}

fn parse_timestamp_value(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.fixed_offset())
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<FixedOffset>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

// ═══════════════════════════════════════════
// Lenient field deserializers
// ═══════════════════════════════════════════

/// Accept numbers and numeric strings; anything else reads as missing so a
/// single malformed field cannot reject a whole export.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
