//! Strength progress tracking.
//!
//! Reads the estimated-1RM history of an exercise, builds progression series
//! over a time window, and decides whether a freshly logged set establishes a
//! new record. Lookups that find nothing return empty results, never errors.

use crate::formula;
use crate::{
    Confidence, EntityStore, FormulaMethod, MaxSource, OneRepMaxHistory, PersonalRecord,
    RecordType, Result,
};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Time range of a progression series
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    LastMonth,
    #[default]
    ThreeMonths,
    SixMonths,
    Year,
    AllTime,
}

impl TimeWindow {
    /// Earliest date included in the window, or `None` for all time
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            TimeWindow::LastMonth => 1,
            TimeWindow::ThreeMonths => 3,
            TimeWindow::SixMonths => 6,
            TimeWindow::Year => 12,
            TimeWindow::AllTime => return None,
        };
        // Saturates to the earliest representable date on underflow
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// Parse a window name such as `3m`, `year` or `all`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "1m" | "month" | "last_month" => Some(TimeWindow::LastMonth),
            "3m" | "three_months" => Some(TimeWindow::ThreeMonths),
            "6m" | "six_months" => Some(TimeWindow::SixMonths),
            "1y" | "year" => Some(TimeWindow::Year),
            "all" | "all_time" => Some(TimeWindow::AllTime),
            _ => None,
        }
    }
}

/// A plotted point of a progression series
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub date: DateTime<Utc>,
    pub estimated_max: f64,
    pub confidence_weight: f64,
    pub source: MaxSource,
}

/// Entities created when a set beats the current best
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecord {
    pub history_id: Uuid,
    pub personal_record_id: Uuid,
    pub estimated_max: f64,
    /// Best that was superseded, if any
    pub previous_best: Option<f64>,
}

/// History of an exercise, newest first
pub fn history_for(store: &EntityStore, exercise_id: Uuid) -> Vec<&OneRepMaxHistory> {
    let mut entries: Vec<_> = store
        .history_entries()
        .filter(|h| h.exercise_id == exercise_id)
        .collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

/// Most recent history entry for the exercise named `exercise_name`
///
/// The name is matched case-insensitively against the catalog. Unknown names
/// and exercises without history both yield `None`.
pub fn current_best<'a>(store: &'a EntityStore, exercise_name: &str) -> Option<&'a OneRepMaxHistory> {
    let exercise = store.exercise_by_name(exercise_name)?;
    history_for(store, exercise.id).into_iter().next()
}

/// Check a logged set against the current best and record it if it wins
///
/// Only completed sets with at least one rep are considered. When the Epley
/// estimate exceeds the current best (or there is none), one history entry
/// and one calculated personal record are created. Otherwise nothing changes.
pub fn record_set(store: &mut EntityStore, set_id: Uuid) -> Result<Option<NewRecord>> {
    record_set_at(store, set_id, Utc::now())
}

/// [`record_set`] with an explicit timestamp for the created entities
pub fn record_set_at(
    store: &mut EntityStore,
    set_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<NewRecord>> {
    let Some(set) = store.set(set_id) else {
        tracing::debug!("Set {} not found, nothing to record", set_id);
        return Ok(None);
    };
    if !set.completed || set.reps == 0 {
        return Ok(None);
    }
    let (weight, reps, workout_exercise_id) = (set.weight, set.reps, set.workout_exercise_id);

    let Some(exercise_id) = store
        .workout_exercise(workout_exercise_id)
        .map(|we| we.exercise_id)
    else {
        tracing::warn!("Set {} has no owning workout exercise", set_id);
        return Ok(None);
    };
    let Some(exercise_name) = store.exercise(exercise_id).map(|e| e.name.clone()) else {
        tracing::warn!("Workout exercise {} references a missing exercise", workout_exercise_id);
        return Ok(None);
    };

    let estimated_max = formula::epley(weight, reps);
    let previous_best = current_best(store, &exercise_name).map(|h| h.estimated_max);

    if let Some(best) = previous_best {
        if estimated_max <= best {
            tracing::debug!(
                "{}: {:.1} does not beat current best {:.1}",
                exercise_name,
                estimated_max,
                best
            );
            return Ok(None);
        }
    }

    let personal_record_id = store.insert_personal_record(PersonalRecord {
        id: Uuid::new_v4(),
        exercise_id,
        weight,
        reps,
        date: now,
        record_type: RecordType::Calculated,
        method: FormulaMethod::Epley,
        workout_exercise_id: Some(workout_exercise_id),
    })?;

    let history_id = store.insert_history(OneRepMaxHistory {
        id: Uuid::new_v4(),
        exercise_id,
        estimated_max,
        date: now,
        source: MaxSource::LoggedSet,
        method: FormulaMethod::Epley,
        confidence: Confidence::from_reps(reps),
        personal_record_id: Some(personal_record_id),
    })?;

    tracing::info!(
        "New estimated max for {}: {:.1} ({} x {})",
        exercise_name,
        estimated_max,
        weight,
        reps
    );

    Ok(Some(NewRecord {
        history_id,
        personal_record_id,
        estimated_max,
        previous_best,
    }))
}

/// Record a directly tested lift as an actual personal record
///
/// The history entry carries high confidence and the Epley estimate of the
/// lift (equal to the weight plus a small margin for a single).
pub fn record_tested_max(
    store: &mut EntityStore,
    exercise_id: Uuid,
    weight: f64,
    reps: u32,
    date: DateTime<Utc>,
) -> Result<NewRecord> {
    let previous_best = history_for(store, exercise_id)
        .first()
        .map(|h| h.estimated_max);

    let personal_record_id = store.insert_personal_record(PersonalRecord {
        id: Uuid::new_v4(),
        exercise_id,
        weight,
        reps,
        date,
        record_type: RecordType::Actual,
        method: FormulaMethod::Epley,
        workout_exercise_id: None,
    })?;

    let estimated_max = formula::epley(weight, reps);
    let history_id = store.insert_history(OneRepMaxHistory {
        id: Uuid::new_v4(),
        exercise_id,
        estimated_max,
        date,
        source: MaxSource::Tested,
        method: FormulaMethod::Epley,
        confidence: Confidence::High,
        personal_record_id: Some(personal_record_id),
    })?;

    Ok(NewRecord {
        history_id,
        personal_record_id,
        estimated_max,
        previous_best,
    })
}

/// Progression series of an exercise within `window`, newest first
pub fn progression(store: &EntityStore, exercise_id: Uuid, window: TimeWindow) -> Vec<ProgressPoint> {
    progression_at(store, exercise_id, window, Utc::now())
}

/// [`progression`] relative to an explicit `now`
pub fn progression_at(
    store: &EntityStore,
    exercise_id: Uuid,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<ProgressPoint> {
    let cutoff = window.cutoff(now);
    history_for(store, exercise_id)
        .into_iter()
        .filter(|h| cutoff.map_or(true, |c| h.date >= c))
        .map(|h| ProgressPoint {
            date: h.date,
            estimated_max: h.estimated_max,
            confidence_weight: h.confidence.weight(),
            source: h.source,
        })
        .collect()
}

/// A row in the progression CSV
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    estimated_max: f64,
    confidence_weight: f64,
    source: &'static str,
}

impl From<&ProgressPoint> for CsvRow {
    fn from(point: &ProgressPoint) -> Self {
        CsvRow {
            date: point.date.to_rfc3339(),
            estimated_max: point.estimated_max,
            confidence_weight: point.confidence_weight,
            source: point.source.as_str(),
        }
    }
}

/// Write a progression series to CSV, oldest first, replacing `path`
pub fn write_progression_csv(points: &[ProgressPoint], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for point in points.iter().rev() {
        writer.serialize(CsvRow::from(point))?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} progression points to {:?}", points.len(), path);
    Ok(points.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::store_with_workout;
    use chrono::{Duration, TimeZone};

    fn first_set(store: &EntityStore, entry: Uuid) -> Uuid {
        store.sets_of(entry)[0].id
    }

    fn add_history(store: &mut EntityStore, exercise_id: Uuid, value: f64, days_ago: i64, confidence: Confidence) {
        store
            .insert_history(OneRepMaxHistory {
                id: Uuid::new_v4(),
                exercise_id,
                estimated_max: value,
                date: Utc::now() - Duration::days(days_ago),
                source: MaxSource::Manual,
                method: FormulaMethod::Epley,
                confidence,
                personal_record_id: None,
            })
            .unwrap();
    }

    #[test]
    fn test_history_sorted_newest_first() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;
        add_history(&mut store, exercise_id, 100.0, 30, Confidence::Medium);
        add_history(&mut store, exercise_id, 110.0, 1, Confidence::Medium);
        add_history(&mut store, exercise_id, 105.0, 10, Confidence::Medium);

        let values: Vec<f64> = history_for(&store, exercise_id)
            .iter()
            .map(|h| h.estimated_max)
            .collect();
        assert_eq!(values, vec![110.0, 105.0, 100.0]);
    }

    #[test]
    fn test_history_empty_for_unknown_exercise() {
        let (store, _, _) = store_with_workout(0);
        assert!(history_for(&store, Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_current_best_lookup() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;

        assert!(current_best(&store, "back squat").is_none());
        assert!(current_best(&store, "Deadlift").is_none());

        add_history(&mut store, exercise_id, 120.0, 5, Confidence::High);
        add_history(&mut store, exercise_id, 115.0, 1, Confidence::Medium);

        // Most recent, not highest
        let best = current_best(&store, "BACK SQUAT").unwrap();
        assert_eq!(best.estimated_max, 115.0);
    }

    #[test]
    fn test_record_set_creates_record_when_no_best() {
        crate::logging::init_test();
        let (mut store, _, entry) = store_with_workout(1);
        let set_id = first_set(&store, entry);
        store.complete_set(set_id).unwrap();

        let outcome = record_set(&mut store, set_id).unwrap().unwrap();

        assert!((outcome.estimated_max - 116.667).abs() < 0.01);
        assert_eq!(outcome.previous_best, None);
        assert_eq!(store.counts().history, 1);
        assert_eq!(store.counts().personal_records, 1);

        let pr = store.personal_record(outcome.personal_record_id).unwrap();
        assert_eq!(pr.record_type, RecordType::Calculated);
        assert_eq!(pr.method, FormulaMethod::Epley);
        assert_eq!(pr.workout_exercise_id, Some(entry));

        let history = store.history_entry(outcome.history_id).unwrap();
        assert_eq!(history.source, MaxSource::LoggedSet);
        assert_eq!(history.confidence, Confidence::Medium);
        assert_eq!(history.personal_record_id, Some(outcome.personal_record_id));
    }

    #[test]
    fn test_record_set_only_when_exceeding_best() {
        let (mut store, _, entry) = store_with_workout(3);
        let sets: Vec<Uuid> = store.sets_of(entry).iter().map(|s| s.id).collect();
        for id in &sets {
            store.complete_set(*id).unwrap();
        }

        // 105 x 5 first, then 100 x 5 does not beat it, then 110 x 5 does
        assert!(record_set(&mut store, sets[1]).unwrap().is_some());
        assert!(record_set(&mut store, sets[0]).unwrap().is_none());
        assert_eq!(store.counts().history, 1);
        assert_eq!(store.counts().personal_records, 1);

        let outcome = record_set(&mut store, sets[2]).unwrap().unwrap();
        assert!(outcome.previous_best.is_some());
        assert_eq!(store.counts().history, 2);
        assert_eq!(store.counts().personal_records, 2);
    }

    #[test]
    fn test_equal_estimate_is_not_a_record() {
        let (mut store, _, entry) = store_with_workout(1);
        let set_id = first_set(&store, entry);
        store.complete_set(set_id).unwrap();

        assert!(record_set(&mut store, set_id).unwrap().is_some());
        assert!(record_set(&mut store, set_id).unwrap().is_none());
        assert_eq!(store.counts().history, 1);
    }

    #[test]
    fn test_incomplete_or_unknown_set_is_noop() {
        let (mut store, _, entry) = store_with_workout(1);
        let set_id = first_set(&store, entry);

        assert!(record_set(&mut store, set_id).unwrap().is_none());
        assert!(record_set(&mut store, Uuid::new_v4()).unwrap().is_none());
        assert_eq!(store.counts().history, 0);
    }

    #[test]
    fn test_confidence_follows_reps() {
        let (mut store, _, entry) = store_with_workout(0);
        let single = store.add_set(entry, 150.0, 1).unwrap();
        let many = store.add_set(entry, 60.0, 20).unwrap();
        store.complete_set(single).unwrap();
        store.complete_set(many).unwrap();

        let outcome = record_set(&mut store, single).unwrap().unwrap();
        assert_eq!(
            store.history_entry(outcome.history_id).unwrap().confidence,
            Confidence::High
        );

        // Clear history so the high-rep set wins
        let history_ids = store.history_ids();
        for id in history_ids {
            store.delete_history_entry(id);
        }
        let outcome = record_set(&mut store, many).unwrap().unwrap();
        assert_eq!(
            store.history_entry(outcome.history_id).unwrap().confidence,
            Confidence::Low
        );
    }

    #[test]
    fn test_progression_window() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;
        add_history(&mut store, exercise_id, 100.0, 400, Confidence::Low);
        add_history(&mut store, exercise_id, 105.0, 60, Confidence::Medium);
        add_history(&mut store, exercise_id, 110.0, 5, Confidence::High);

        let month = progression(&store, exercise_id, TimeWindow::LastMonth);
        assert_eq!(month.len(), 1);
        assert_eq!(month[0].confidence_weight, 1.0);

        let quarter = progression(&store, exercise_id, TimeWindow::ThreeMonths);
        assert_eq!(quarter.len(), 2);
        assert_eq!(quarter[1].confidence_weight, 0.6);

        let all = progression(&store, exercise_id, TimeWindow::AllTime);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].confidence_weight, 0.3);
    }

    #[test]
    fn test_cutoff_uses_calendar_months() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let cutoff = TimeWindow::LastMonth.cutoff(now).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        assert!(TimeWindow::AllTime.cutoff(now).is_none());
    }

    #[test]
    fn test_record_tested_max() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;

        let outcome = record_tested_max(&mut store, exercise_id, 140.0, 1, Utc::now()).unwrap();

        let pr = store.personal_record(outcome.personal_record_id).unwrap();
        assert_eq!(pr.record_type, RecordType::Actual);
        let history = store.history_entry(outcome.history_id).unwrap();
        assert_eq!(history.source, MaxSource::Tested);
        assert_eq!(history.confidence, Confidence::High);
        assert!(record_tested_max(&mut store, Uuid::new_v4(), 1.0, 1, Utc::now()).is_err());
    }

    #[test]
    fn test_write_progression_csv() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;
        add_history(&mut store, exercise_id, 100.0, 10, Confidence::Medium);
        add_history(&mut store, exercise_id, 110.0, 2, Confidence::High);

        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("progress.csv");
        let points = progression(&store, exercise_id, TimeWindow::AllTime);

        let written = write_progression_csv(&points, &csv_path).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,estimated_max,confidence_weight,source");
        assert!(lines[1].contains(",100.0,0.6,manual"));
        assert!(lines[2].contains(",110.0,1.0,manual"));
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(TimeWindow::parse("3m"), Some(TimeWindow::ThreeMonths));
        assert_eq!(TimeWindow::parse("ALL"), Some(TimeWindow::AllTime));
        assert_eq!(TimeWindow::parse("fortnight"), None);
    }
}
