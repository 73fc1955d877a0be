//! Export document -> store.
//!
//! Import is strictly sequential:
//!
//! ```text
//! ReadBytes → ParseDocument → ValidateFormatMarker → ClearStore →
//! RestoreExercises → RestoreProfiles → Checkpoint → RestoreWorkouts →
//! RestorePersonalRecords → RestoreOneRepMaxHistory → FinalCheckpoint → Done
//! ```
//!
//! Everything up to `ValidateFormatMarker` is strict and leaves the store
//! untouched on failure. From `ClearStore` on, restoration is best effort:
//! records whose references cannot be resolved are skipped one by one.
//! A storage failure at a checkpoint is propagated; whatever the earlier
//! checkpoint saved stays saved.

use super::document::{
    parse_ref, ExerciseRecord, OneRepMaxHistoryRecord, PersonalRecordRecord, UserProfileRecord,
    WorkoutRecord, FORMAT_MARKER,
};
use crate::cleanup::{self, WipeReport};
use crate::persist::StoreSink;
use crate::{
    EntityCounts, EntityStore, Error, OneRepMaxHistory, PersonalRecord, Result, Workout,
    WorkoutExercise,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Stages of an import, in the only order they may run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ImportStage {
    ReadBytes,
    ParseDocument,
    ValidateFormatMarker,
    ClearStore,
    RestoreExercises,
    RestoreProfiles,
    Checkpoint,
    RestoreWorkouts,
    RestorePersonalRecords,
    RestoreOneRepMaxHistory,
    FinalCheckpoint,
    Done,
}

impl ImportStage {
    pub fn next(self) -> Option<ImportStage> {
        use ImportStage::*;
        match self {
            ReadBytes => Some(ParseDocument),
            ParseDocument => Some(ValidateFormatMarker),
            ValidateFormatMarker => Some(ClearStore),
            ClearStore => Some(RestoreExercises),
            RestoreExercises => Some(RestoreProfiles),
            RestoreProfiles => Some(Checkpoint),
            Checkpoint => Some(RestoreWorkouts),
            RestoreWorkouts => Some(RestorePersonalRecords),
            RestorePersonalRecords => Some(RestoreOneRepMaxHistory),
            RestoreOneRepMaxHistory => Some(FinalCheckpoint),
            FinalCheckpoint => Some(Done),
            Done => None,
        }
    }

    /// Whether reaching this stage means the previous store contents are gone
    pub fn is_destructive(self) -> bool {
        !matches!(
            self,
            ImportStage::ReadBytes | ImportStage::ParseDocument | ImportStage::ValidateFormatMarker
        )
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Records left out of the restored graph, by reason
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Top-level records that did not fit their record type
    pub malformed: usize,
    /// Records whose id was already restored in this pass
    pub duplicates: usize,
    /// Records whose required exercise reference did not resolve
    pub unresolved: usize,
    /// Optional links dropped because their target was not restored
    pub dropped_links: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.malformed + self.duplicates + self.unresolved
    }
}

/// Outcome of a completed import
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportReport {
    pub export_date: DateTime<Utc>,
    pub wiped: WipeReport,
    pub restored: EntityCounts,
    pub skipped: SkipCounts,
    pub stage: ImportStage,
}

/// A validated document, typed per entity kind
#[derive(Clone, Debug)]
pub struct ParsedDocument {
    pub export_date: DateTime<Utc>,
    pub exercises: Vec<ExerciseRecord>,
    pub workouts: Vec<WorkoutRecord>,
    pub user_profiles: Vec<UserProfileRecord>,
    pub personal_records: Vec<PersonalRecordRecord>,
    pub one_rep_max_history: Vec<OneRepMaxHistoryRecord>,
    /// Top-level records dropped at the typing boundary
    pub malformed: usize,
}

impl ParsedDocument {
    pub fn record_count(&self) -> usize {
        self.exercises.len()
            + self.workouts.len()
            + self.user_profiles.len()
            + self.personal_records.len()
            + self.one_rep_max_history.len()
    }
}

/// Tracks the current stage and refuses to go anywhere but forward by one
struct StageTracker {
    stage: ImportStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: ImportStage::ReadBytes,
        }
    }

    fn advance(&mut self, to: ImportStage) {
        debug_assert_eq!(self.stage.next(), Some(to), "import stage out of order");
        tracing::debug!("Import stage: {} -> {}", self.stage, to);
        self.stage = to;
    }
}

/// Read an export file and import it
pub fn import_file(path: &Path, store: &mut EntityStore, sink: &mut dyn StoreSink) -> Result<ImportReport> {
    let bytes = std::fs::read(path)?;
    import_bytes(&bytes, store, sink)
}

/// Replace the store's contents with the graph in `bytes`
///
/// Input-validation failures ([`Error::MalformedDocument`],
/// [`Error::NotARecognizedExport`]) happen before anything is deleted. After
/// that the store is wiped unconditionally, even for a document with no
/// records: an import replaces everything.
pub fn import_bytes(bytes: &[u8], store: &mut EntityStore, sink: &mut dyn StoreSink) -> Result<ImportReport> {
    let mut tracker = StageTracker::new();

    tracker.advance(ImportStage::ParseDocument);
    let object = parse_object(bytes)?;

    tracker.advance(ImportStage::ValidateFormatMarker);
    let document = type_document(&object)?;

    tracker.advance(ImportStage::ClearStore);
    let wiped = cleanup::wipe_all(store);

    restore(document, wiped, store, sink, &mut tracker)
}

/// Parse and validate `bytes` without touching any store
pub fn parse_document(bytes: &[u8]) -> Result<ParsedDocument> {
    let object = parse_object(bytes)?;
    type_document(&object)
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedDocument(e.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(Error::MalformedDocument(
            "top level is not a JSON object".to_string(),
        )),
    }
}

fn type_document(object: &Map<String, Value>) -> Result<ParsedDocument> {
    let export_date = object
        .get(FORMAT_MARKER)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(Error::NotARecognizedExport(FORMAT_MARKER))?;

    let mut malformed = 0;
    let exercises = typed_list(object, "exercises", &mut malformed)?;
    let workouts: Vec<WorkoutRecord> = typed_list(object, "workouts", &mut malformed)?;
    malformed += workouts.iter().map(WorkoutRecord::dropped_nested).sum::<usize>();
    let user_profiles = typed_list(object, "userProfiles", &mut malformed)?;
    let personal_records = typed_list(object, "personalRecords", &mut malformed)?;
    let one_rep_max_history = typed_list(object, "oneRepMaxHistory", &mut malformed)?;

    Ok(ParsedDocument {
        export_date,
        exercises,
        workouts,
        user_profiles,
        personal_records,
        one_rep_max_history,
        malformed,
    })
}

/// Type each element of a top-level list, skipping the ones that don't fit
///
/// A missing key is an empty list; a key holding something other than a
/// list makes the whole document malformed.
fn typed_list<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    malformed: &mut usize,
) -> Result<Vec<T>> {
    let items = match object.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(Error::MalformedDocument(format!("'{}' is not a list", key)));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record #{}: {}", key, index, e);
                *malformed += 1;
            }
        }
    }
    Ok(records)
}

fn restore(
    document: ParsedDocument,
    wiped: WipeReport,
    store: &mut EntityStore,
    sink: &mut dyn StoreSink,
    tracker: &mut StageTracker,
) -> Result<ImportReport> {
    let mut skipped = SkipCounts {
        malformed: document.malformed,
        ..SkipCounts::default()
    };

    // Lookup tables hold only what this pass restored, never pre-wipe state
    tracker.advance(ImportStage::RestoreExercises);
    let mut exercise_ids: HashSet<Uuid> = HashSet::new();
    for record in document.exercises {
        if !exercise_ids.insert(record.id) {
            tracing::warn!("Dropping duplicate exercise {} ({})", record.id, record.name);
            skipped.duplicates += 1;
            continue;
        }
        store.insert_exercise(record.into());
    }

    tracker.advance(ImportStage::RestoreProfiles);
    let mut profile_ids: HashSet<Uuid> = HashSet::new();
    for record in document.user_profiles {
        if !profile_ids.insert(record.id) {
            tracing::warn!("Dropping duplicate user profile {}", record.id);
            skipped.duplicates += 1;
            continue;
        }
        store.insert_profile(record.into());
    }

    tracker.advance(ImportStage::Checkpoint);
    sink.save(store)?;

    tracker.advance(ImportStage::RestoreWorkouts);
    let workout_exercise_ids =
        restore_workouts(document.workouts, &exercise_ids, store, &mut skipped);

    tracker.advance(ImportStage::RestorePersonalRecords);
    let mut record_ids: HashSet<Uuid> = HashSet::new();
    for record in document.personal_records {
        if record_ids.contains(&record.id) {
            tracing::warn!("Duplicate personal record id {}, keeping first", record.id);
            skipped.duplicates += 1;
            continue;
        }
        let Some(exercise_id) = resolve(&record.exercise_id, &exercise_ids) else {
            tracing::warn!(
                "Skipping personal record {}: exercise {} not in import",
                record.id,
                record.exercise_id
            );
            skipped.unresolved += 1;
            continue;
        };
        let workout_exercise_id = match record.workout_exercise_id.as_deref() {
            None => None,
            Some(raw) => {
                let resolved = resolve(raw, &workout_exercise_ids);
                if resolved.is_none() {
                    tracing::debug!(
                        "Personal record {} loses link to workout exercise {}",
                        record.id,
                        raw
                    );
                    skipped.dropped_links += 1;
                }
                resolved
            }
        };

        store.insert_personal_record(PersonalRecord {
            id: record.id,
            exercise_id,
            weight: record.weight,
            reps: record.reps,
            date: record.date,
            record_type: record.record_type,
            method: record.method,
            workout_exercise_id,
        })?;
        record_ids.insert(record.id);
    }

    tracker.advance(ImportStage::RestoreOneRepMaxHistory);
    let mut history_ids: HashSet<Uuid> = HashSet::new();
    for record in document.one_rep_max_history {
        if history_ids.contains(&record.id) {
            tracing::warn!("Duplicate history id {}, keeping first", record.id);
            skipped.duplicates += 1;
            continue;
        }
        let Some(exercise_id) = resolve(&record.exercise_id, &exercise_ids) else {
            tracing::warn!(
                "Skipping history entry {}: exercise {} not in import",
                record.id,
                record.exercise_id
            );
            skipped.unresolved += 1;
            continue;
        };
        let personal_record_id = match record.personal_record_id.as_deref() {
            None => None,
            Some(raw) => {
                let resolved = resolve(raw, &record_ids);
                if resolved.is_none() {
                    skipped.dropped_links += 1;
                }
                resolved
            }
        };

        store.insert_history(OneRepMaxHistory {
            id: record.id,
            exercise_id,
            estimated_max: record.estimated_max,
            date: record.date,
            source: record.source,
            method: record.method,
            confidence: record.confidence,
            personal_record_id,
        })?;
        history_ids.insert(record.id);
    }

    tracker.advance(ImportStage::FinalCheckpoint);
    sink.save(store)?;

    tracker.advance(ImportStage::Done);
    let restored = store.counts();
    tracing::info!(
        "Import complete: {} entities restored, {} records skipped",
        restored.total(),
        skipped.total()
    );

    Ok(ImportReport {
        export_date: document.export_date,
        wiped,
        restored,
        skipped,
        stage: tracker.stage,
    })
}

/// Restore workouts with their entries and sets. Returns the restored entry ids.
fn restore_workouts(
    workouts: Vec<WorkoutRecord>,
    exercise_ids: &HashSet<Uuid>,
    store: &mut EntityStore,
    skipped: &mut SkipCounts,
) -> HashSet<Uuid> {
    let mut workout_ids: HashSet<Uuid> = HashSet::new();
    let mut entry_ids: HashSet<Uuid> = HashSet::new();
    let mut set_ids: HashSet<Uuid> = HashSet::new();

    for record in workouts {
        if !workout_ids.insert(record.id) {
            tracing::warn!("Dropping duplicate workout {} ({})", record.id, record.name);
            skipped.duplicates += 1;
            continue;
        }

        let workout_id = store.insert_workout(Workout {
            id: record.id,
            name: record.name,
            date: record.date,
            duration_seconds: record.duration,
            notes: record.notes,
        });

        let mut entries = record.exercises.items;
        entries.sort_by_key(|e| e.order_index);
        let mut order_index = 0;

        for entry in entries {
            if entry_ids.contains(&entry.id) {
                tracing::warn!("Duplicate workout exercise id {}, keeping first", entry.id);
                skipped.duplicates += 1;
                continue;
            }
            let Some(exercise_id) = resolve(&entry.exercise_id, exercise_ids) else {
                tracing::warn!(
                    "Skipping workout exercise {} in workout {}: exercise {} not in import",
                    entry.id,
                    workout_id,
                    entry.exercise_id
                );
                skipped.unresolved += 1;
                continue;
            };

            let inserted = store.insert_workout_exercise(WorkoutExercise {
                id: entry.id,
                workout_id,
                exercise_id,
                order_index,
                rest_seconds: entry.rest_time,
                notes: entry.notes,
            });
            if let Err(e) = inserted {
                tracing::warn!("Skipping workout exercise {}: {}", entry.id, e);
                skipped.unresolved += 1;
                continue;
            }
            entry_ids.insert(entry.id);
            order_index += 1;

            // Stable sort: sets sharing a number keep their document order
            let mut sets = entry.sets.items;
            sets.sort_by_key(|s| s.set_number);
            let mut set_number = 0;
            for set in sets {
                if !set_ids.insert(set.id) {
                    tracing::warn!("Duplicate set id {}, keeping first", set.id);
                    skipped.duplicates += 1;
                    continue;
                }
                let mut restored = set.into_set(entry.id);
                restored.set_number = set_number + 1;
                match store.insert_set(restored) {
                    Ok(_) => set_number += 1,
                    Err(e) => {
                        tracing::warn!("Skipping set: {}", e);
                        skipped.unresolved += 1;
                    }
                }
            }
        }
    }

    entry_ids
}

fn resolve(raw: &str, known: &HashSet<Uuid>) -> Option<Uuid> {
    parse_ref(raw).filter(|id| known.contains(id))
}
