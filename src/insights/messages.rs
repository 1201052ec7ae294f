use chrono::NaiveDate;

use crate::models::PainTrend;

/// Wording for predictive indicators and brief highlights.
pub struct InsightTemplates;

impl InsightTemplates {
    pub fn rising_trend(slope: f64, days: usize) -> String {
        format!(
            "Pain has been rising by about {:.1} points per day over the last {} tracked days.",
            slope, days,
        )
    }

    pub fn recent_spike(value: f64, date: NaiveDate) -> String {
        format!(
            "Pain on {} ({:.1}) was well above your usual range.",
            date, value,
        )
    }

    pub fn trigger_exposure(trigger: &str, delta: f64) -> String {
        format!(
            "{} was logged recently; on past days with it, pain averaged {:.1} points higher.",
            trigger, delta,
        )
    }

    // ── Brief highlights ──────────────────────────────────

    pub fn weekly_average(avg: f64, previous: Option<f64>, trend: PainTrend) -> String {
        match previous {
            Some(prev) => format!(
                "Average pain this week was {:.1} (previous week {:.1}, {}).",
                avg,
                prev,
                trend.as_str(),
            ),
            None => format!("Average pain this week was {:.1}.", avg),
        }
    }

    pub fn no_entries_this_week() -> String {
        "No entries were logged this week.".to_string()
    }

    pub fn open_episode(start: NaiveDate, peak: f64) -> String {
        format!(
            "A pain episode that started on {} is still ongoing (peak {:.0}).",
            start, peak,
        )
    }

    pub fn top_trigger(trigger: &str, delta: f64) -> String {
        format!(
            "Strongest trigger so far: {} (+{:.1} points on average).",
            trigger, delta,
        )
    }

    pub fn best_intervention(name: &str, reduction: f64) -> String {
        format!(
            "{} goes with {:.1} points less pain on average.",
            name, reduction,
        )
    }
}
