use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{CorrelationStrength, Direction, EffectivenessRating, PainEntry};
use crate::patterns::{classify_pain_trend, AnalysisResult};
use crate::stats::{mean, round_to};

use super::interventions::intervention_effectiveness;
use super::messages::InsightTemplates;
use super::predictive::predictive_indicators;
use super::types::ClinicalBrief;

const TOP_TRIGGERS: usize = 3;
const TOP_INTERVENTIONS: usize = 3;

/// Saturates at the earliest representable date instead of panicking.
fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

fn pain_between(entries: &[PainEntry], start: NaiveDate, end: NaiveDate) -> Vec<f64> {
    entries
        .iter()
        .filter(|e| (start..=end).contains(&e.date()))
        .map(|e| e.pain_level)
        .collect()
}

/// Brief covering the 7 days ending on `now`'s date, compared with the
/// 7 days before.
///
/// The id is a name-based UUID over the week and its entry count, so the
/// same analysis yields the same brief id.
pub fn weekly_brief(result: &AnalysisResult, now: DateTime<Utc>) -> ClinicalBrief {
    let week_end = now.date_naive();
    let week_start = days_before(week_end, 6);
    let previous_end = days_before(week_start, 1);
    let previous_start = days_before(previous_end, 6);

    let this_week = pain_between(&result.entries, week_start, week_end);
    let previous_week = pain_between(&result.entries, previous_start, previous_end);

    let avg_pain = round_to(mean(&this_week), 2);
    let previous_avg_pain = (!previous_week.is_empty()).then(|| round_to(mean(&previous_week), 2));
    let pain_change = match previous_avg_pain {
        Some(prev) if !this_week.is_empty() => Some(round_to(avg_pain - prev, 2)),
        _ => None,
    };
    let pain_trend = classify_pain_trend(pain_change.unwrap_or(0.0));

    let open_episodes: Vec<_> = result.episodes.iter().filter(|e| e.ongoing).cloned().collect();
    let episodes_this_week = result
        .episodes
        .iter()
        .filter(|e| e.end_date >= week_start && e.start_date <= week_end)
        .count();

    let top_triggers: Vec<_> = result
        .trigger_correlations
        .iter()
        .filter(|c| c.direction == Direction::Increases)
        .take(TOP_TRIGGERS)
        .cloned()
        .collect();
    let qol_highlights: Vec<_> = result
        .qol_patterns
        .iter()
        .filter(|p| p.strength >= CorrelationStrength::Moderate)
        .cloned()
        .collect();

    let mut interventions = intervention_effectiveness(&result.entries, &result.baseline);
    interventions.truncate(TOP_INTERVENTIONS);
    let indicators = predictive_indicators(
        &result.entries,
        &result.daily_trend,
        &result.trigger_correlations,
    );

    let mut highlights = Vec::new();
    if this_week.is_empty() {
        highlights.push(InsightTemplates::no_entries_this_week());
    } else {
        highlights.push(InsightTemplates::weekly_average(
            avg_pain,
            previous_avg_pain,
            pain_trend,
        ));
    }
    for episode in &open_episodes {
        highlights.push(InsightTemplates::open_episode(
            episode.start_date,
            episode.peak_pain,
        ));
    }
    if let Some(trigger) = top_triggers.first() {
        highlights.push(InsightTemplates::top_trigger(&trigger.factor, trigger.delta_pain));
    }
    if let Some(best) = interventions
        .iter()
        .find(|i| i.rating == EffectivenessRating::Effective)
    {
        highlights.push(InsightTemplates::best_intervention(
            &best.intervention,
            best.pain_reduction,
        ));
    }
    highlights.extend(result.qol_dissonances.iter().map(|d| d.description.clone()));

    let entry_count = this_week.len();
    let id = Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("painscope:brief:{week_start}:{week_end}:{entry_count}").as_bytes(),
    );

    tracing::info!(
        brief_id = %id,
        %week_start,
        %week_end,
        entries = entry_count,
        trend = pain_trend.as_str(),
        "Weekly brief generated"
    );

    ClinicalBrief {
        id,
        week_start,
        week_end,
        entry_count,
        avg_pain,
        previous_avg_pain,
        pain_change,
        pain_trend,
        episodes_this_week,
        open_episodes,
        top_triggers,
        qol_highlights,
        dissonances: result.qol_dissonances.clone(),
        interventions,
        indicators,
        data_quality: result.metadata.data_quality,
        highlights,
        cautions: result.metadata.cautions.clone(),
    }
}
