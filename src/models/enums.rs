use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Variant order matters: derived Ord ranks low < medium < high.
str_enum!(ConfidenceLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(CorrelationStrength {
    None => "none",
    Weak => "weak",
    Moderate => "moderate",
    Strong => "strong",
});

str_enum!(Direction {
    Increases => "increases",
    Decreases => "decreases",
    Neutral => "neutral",
});

str_enum!(EpisodeSeverity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(DataQuality {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(FactorKind {
    Trigger => "trigger",
    Symptom => "symptom",
    Medication => "medication",
    Location => "location",
});

str_enum!(QolDimension {
    Sleep => "sleep",
    Mood => "mood",
    Activity => "activity",
});

str_enum!(PainTrend {
    Improving => "improving",
    Stable => "stable",
    Worsening => "worsening",
});

// Only SleepDeclinePainStable is produced today; the others are reserved.
str_enum!(DissonanceType {
    SleepDeclinePainStable => "sleep_decline_pain_stable",
    PainHighActivityHigh => "pain_high_activity_high",
    PainImprovingQolStagnant => "pain_improving_qol_stagnant",
});

str_enum!(DissonanceSeverity {
    Medium => "medium",
    High => "high",
});

str_enum!(EffectivenessRating {
    Ineffective => "ineffective",
    Partial => "partial",
    Effective => "effective",
});

str_enum!(IndicatorKind {
    RisingTrend => "rising_trend",
    RecentSpike => "recent_spike",
    TriggerExposure => "trigger_exposure",
});

impl ConfidenceLevel {
    /// Tier from a raw evidence count (high ≥ `high`, medium ≥ `medium`).
    pub fn from_count(count: usize, medium: usize, high: usize) -> Self {
        if count >= high {
            Self::High
        } else if count >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Numeric weight used when a tier has to feed the strength bucketing.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 0.7,
            Self::High => 0.9,
        }
    }
}

impl FactorKind {
    pub const ALL: [FactorKind; 4] = [
        FactorKind::Trigger,
        FactorKind::Symptom,
        FactorKind::Medication,
        FactorKind::Location,
    ];
}

impl QolDimension {
    pub const ALL: [QolDimension; 3] = [
        QolDimension::Sleep,
        QolDimension::Mood,
        QolDimension::Activity,
    ];

    /// Human label used in patient-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep quality",
            Self::Mood => "mood",
            Self::Activity => "activity level",
        }
    }
}

impl EpisodeSeverity {
    pub fn from_peak(peak: f64) -> Self {
        if peak >= 8.0 {
            Self::Severe
        } else if peak >= 6.0 {
            Self::Moderate
        } else {
            Self::Mild
        }
    }
}

impl Direction {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.3 {
            Self::Increases
        } else if delta < -0.3 {
            Self::Decreases
        } else {
            Self::Neutral
        }
    }
}
