//! Integrity and cleanup service.
//!
//! Owns the safe deletion order for a full wipe. Exercises are referenced by
//! three other kinds, so they go last; workouts cascade to their entries and
//! sets; anything the cascade missed is purged explicitly before exercises.

use crate::EntityStore;
use serde::Serialize;
use std::fmt;

/// One step of a full wipe, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WipeStep {
    PersonalRecords,
    OneRepMaxHistory,
    Workouts,
    UserProfiles,
    Orphans,
    Exercises,
}

impl WipeStep {
    pub const ORDER: [WipeStep; 6] = [
        WipeStep::PersonalRecords,
        WipeStep::OneRepMaxHistory,
        WipeStep::Workouts,
        WipeStep::UserProfiles,
        WipeStep::Orphans,
        WipeStep::Exercises,
    ];
}

impl fmt::Display for WipeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WipeStep::PersonalRecords => "personal records",
            WipeStep::OneRepMaxHistory => "1RM history",
            WipeStep::Workouts => "workouts",
            WipeStep::UserProfiles => "user profiles",
            WipeStep::Orphans => "orphaned entries",
            WipeStep::Exercises => "exercises",
        };
        f.write_str(name)
    }
}

/// Counts of what a wipe removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WipeReport {
    pub personal_records: usize,
    pub history: usize,
    pub workouts: usize,
    /// Entries and sets removed by the workout cascade
    pub cascaded_workout_exercises: usize,
    pub cascaded_sets: usize,
    pub profiles: usize,
    pub orphaned_workout_exercises: usize,
    pub orphaned_sets: usize,
    pub exercises: usize,
}

impl WipeReport {
    pub fn total(&self) -> usize {
        self.personal_records
            + self.history
            + self.workouts
            + self.cascaded_workout_exercises
            + self.cascaded_sets
            + self.profiles
            + self.orphaned_workout_exercises
            + self.orphaned_sets
            + self.exercises
    }
}

/// Delete every entity in safe order. Idempotent.
pub fn wipe_all(store: &mut EntityStore) -> WipeReport {
    wipe_all_observed(store, |_, _| {})
}

/// [`wipe_all`], calling `observer` after each step with the store as it stands
pub fn wipe_all_observed<F>(store: &mut EntityStore, mut observer: F) -> WipeReport
where
    F: FnMut(WipeStep, &EntityStore),
{
    let mut report = WipeReport::default();

    for step in WipeStep::ORDER {
        match step {
            WipeStep::PersonalRecords => {
                for id in store.personal_record_ids() {
                    if store.delete_personal_record(id).is_some() {
                        report.personal_records += 1;
                    }
                }
            }
            WipeStep::OneRepMaxHistory => {
                for id in store.history_ids() {
                    if store.delete_history_entry(id).is_some() {
                        report.history += 1;
                    }
                }
            }
            WipeStep::Workouts => {
                let before = store.counts();
                for id in store.workout_ids() {
                    if store.delete_workout(id).is_ok() {
                        report.workouts += 1;
                    }
                }
                let after = store.counts();
                report.cascaded_workout_exercises =
                    before.workout_exercises - after.workout_exercises;
                report.cascaded_sets = before.sets - after.sets;
            }
            WipeStep::UserProfiles => {
                for id in store.profile_ids() {
                    if store.delete_profile(id).is_some() {
                        report.profiles += 1;
                    }
                }
            }
            WipeStep::Orphans => {
                let (entries, sets) = store.purge_orphans();
                report.orphaned_workout_exercises = entries;
                report.orphaned_sets = sets;
                if entries + sets > 0 {
                    tracing::warn!(
                        "Removed {} orphaned workout exercises and {} orphaned sets",
                        entries,
                        sets
                    );
                }
            }
            WipeStep::Exercises => {
                for id in store.exercise_ids() {
                    match store.delete_exercise(id) {
                        Ok(_) => report.exercises += 1,
                        Err(e) => tracing::error!("Exercise {} survived wipe: {}", id, e),
                    }
                }
            }
        }

        tracing::debug!("Wipe step done: {}", step);
        observer(step, store);
    }

    tracing::info!("Wiped {} entities", report.total());
    report
}
