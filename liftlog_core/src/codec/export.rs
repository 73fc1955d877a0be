//! Store -> export document.

use super::document::{
    ExerciseRecord, ExportDocument, OneRepMaxHistoryRecord, PersonalRecordRecord, SetRecord,
    UserProfileRecord, WorkoutExerciseRecord, WorkoutRecord,
};
use crate::{EntityStore, Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Flatten the store into an export document stamped with `now`
///
/// Takes the store by shared reference, so the document reflects a single
/// consistent snapshot. Fails with [`Error::EmptyStore`] when there is
/// nothing to export.
pub fn export(store: &EntityStore, now: DateTime<Utc>) -> Result<ExportDocument> {
    if store.is_empty() {
        return Err(Error::EmptyStore);
    }

    let mut exercises: Vec<ExerciseRecord> = store.exercises().map(ExerciseRecord::from).collect();
    exercises.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    let mut workouts: Vec<_> = store.workouts().collect();
    workouts.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    let workouts: Vec<WorkoutRecord> = workouts
        .into_iter()
        .map(|workout| {
            let entries = store
                .workout_exercises_of(workout.id)
                .into_iter()
                .map(|entry| {
                    let sets = store
                        .sets_of(entry.id)
                        .into_iter()
                        .map(SetRecord::from)
                        .collect();
                    WorkoutExerciseRecord::from_entry(entry, sets)
                })
                .collect();
            WorkoutRecord::from_workout(workout, entries)
        })
        .collect();

    let user_profiles: Vec<UserProfileRecord> =
        store.profiles().map(UserProfileRecord::from).collect();

    let mut personal_records: Vec<PersonalRecordRecord> = store
        .personal_records()
        .map(PersonalRecordRecord::from)
        .collect();
    personal_records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut one_rep_max_history: Vec<OneRepMaxHistoryRecord> = store
        .history_entries()
        .map(OneRepMaxHistoryRecord::from)
        .collect();
    one_rep_max_history.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    tracing::info!(
        "Exported {} exercises, {} workouts, {} records, {} history entries",
        exercises.len(),
        workouts.len(),
        personal_records.len(),
        one_rep_max_history.len()
    );

    Ok(ExportDocument {
        exercises,
        workouts,
        user_profiles,
        personal_records,
        one_rep_max_history,
        export_date: now,
    })
}

/// Export to pretty-printed JSON bytes
pub fn export_to_vec(store: &EntityStore, now: DateTime<Utc>) -> Result<Vec<u8>> {
    let document = export(store, now)?;
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Export to a file, replacing it atomically
pub fn export_to_file(store: &EntityStore, path: &Path, now: DateTime<Utc>) -> Result<usize> {
    let bytes = export_to_vec(store, now)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote export to {:?} ({} bytes)", path, bytes.len());
    Ok(bytes.len())
}
