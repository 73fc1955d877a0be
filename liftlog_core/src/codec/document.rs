//! Portable export document.
//!
//! Flattened, camelCase records per entity kind. References to other
//! entities are id strings; the only nesting is a workout's exercise entries
//! and an entry's sets, which travel with their owner.

use crate::{
    Confidence, Equipment, ExerciseType, ExperienceLevel, FormulaMethod, MaxSource, MuscleGroup,
    RecordType, WeightUnit,
};
use crate::{Exercise, ExerciseSet, OneRepMaxHistory, PersonalRecord, UserProfile, Workout, WorkoutExercise};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;
use uuid::Uuid;

/// Top-level key whose presence marks a document as a liftlog export
pub const FORMAT_MARKER: &str = "exportDate";

/// The whole exported graph
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exercises: Vec<ExerciseRecord>,
    pub workouts: Vec<WorkoutRecord>,
    pub user_profiles: Vec<UserProfileRecord>,
    pub personal_records: Vec<PersonalRecordRecord>,
    pub one_rep_max_history: Vec<OneRepMaxHistoryRecord>,
    pub export_date: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: Uuid,
    pub name: String,
    pub primary_muscle: MuscleGroup,
    #[serde(default)]
    pub secondary_muscles: Vec<MuscleGroup>,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    pub exercise_type: ExerciseType,
    #[serde(default)]
    pub is_compound: bool,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: LenientList<WorkoutExerciseRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseRecord {
    pub id: Uuid,
    pub order_index: u32,
    pub rest_time: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub exercise_id: String,
    #[serde(default)]
    pub sets: LenientList<SetRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub id: Uuid,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub rest_time: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    pub workout_days_per_week: u8,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecordRecord {
    pub id: Uuid,
    pub weight: f64,
    pub reps: u32,
    pub date: DateTime<Utc>,
    pub record_type: RecordType,
    pub method: FormulaMethod,
    pub exercise_id: String,
    #[serde(default)]
    pub workout_exercise_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OneRepMaxHistoryRecord {
    pub id: Uuid,
    pub estimated_max: f64,
    pub date: DateTime<Utc>,
    pub source: MaxSource,
    pub method: FormulaMethod,
    pub confidence: Confidence,
    pub exercise_id: String,
    #[serde(default)]
    pub personal_record_id: Option<String>,
}

/// Nested list that drops elements not fitting the record type
///
/// Serializes as a plain list. `dropped` counts what was left out on the
/// way in so the importer can report it.
#[derive(Clone, Debug, PartialEq)]
pub struct LenientList<T> {
    pub items: Vec<T>,
    pub dropped: usize,
}

impl<T> Default for LenientList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dropped: 0,
        }
    }
}

impl<T> From<Vec<T>> for LenientList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items, dropped: 0 }
    }
}

impl<T> Deref for LenientList<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.items
    }
}

impl<T: Serialize> Serialize for LenientList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let mut list = LenientList {
            items: Vec::with_capacity(values.len()),
            dropped: 0,
        };
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value(value) {
                Ok(record) => list.items.push(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed nested record #{}: {}", index, e);
                    list.dropped += 1;
                }
            }
        }
        Ok(list)
    }
}

impl WorkoutRecord {
    /// Nested entries and sets dropped while typing this workout
    pub fn dropped_nested(&self) -> usize {
        self.exercises.dropped + self.exercises.iter().map(|e| e.sets.dropped).sum::<usize>()
    }
}

/// Parse a reference id string
pub(crate) fn parse_ref(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

// ============================================================================
// Entity -> record
// ============================================================================

impl From<&Exercise> for ExerciseRecord {
    fn from(e: &Exercise) -> Self {
        ExerciseRecord {
            id: e.id,
            name: e.name.clone(),
            primary_muscle: e.primary_muscle,
            secondary_muscles: e.secondary_muscles.clone(),
            equipment: e.equipment,
            exercise_type: e.exercise_type,
            is_compound: e.is_compound,
            instructions: e.instructions.clone(),
        }
    }
}

impl From<&ExerciseSet> for SetRecord {
    fn from(s: &ExerciseSet) -> Self {
        SetRecord {
            id: s.id,
            set_number: s.set_number,
            weight: s.weight,
            reps: s.reps,
            is_completed: s.completed,
            rpe: s.rpe,
            rest_time: s.rest_seconds,
            notes: s.notes.clone(),
            duration: s.duration_seconds,
            distance: s.distance,
        }
    }
}

impl WorkoutExerciseRecord {
    pub(crate) fn from_entry(entry: &WorkoutExercise, sets: Vec<SetRecord>) -> Self {
        WorkoutExerciseRecord {
            id: entry.id,
            order_index: entry.order_index,
            rest_time: entry.rest_seconds,
            notes: entry.notes.clone(),
            exercise_id: entry.exercise_id.to_string(),
            sets: sets.into(),
        }
    }
}

impl WorkoutRecord {
    pub(crate) fn from_workout(workout: &Workout, exercises: Vec<WorkoutExerciseRecord>) -> Self {
        WorkoutRecord {
            id: workout.id,
            name: workout.name.clone(),
            date: workout.date,
            duration: workout.duration_seconds,
            notes: workout.notes.clone(),
            exercises: exercises.into(),
        }
    }
}

impl From<&UserProfile> for UserProfileRecord {
    fn from(p: &UserProfile) -> Self {
        UserProfileRecord {
            id: p.id,
            name: p.display_name.clone(),
            weight_unit: p.weight_unit,
            experience_level: p.experience_level,
            workout_days_per_week: p.workout_days_per_week,
            goals: p.goals.clone(),
            equipment: p.equipment.clone(),
        }
    }
}

impl From<&PersonalRecord> for PersonalRecordRecord {
    fn from(pr: &PersonalRecord) -> Self {
        PersonalRecordRecord {
            id: pr.id,
            weight: pr.weight,
            reps: pr.reps,
            date: pr.date,
            record_type: pr.record_type,
            method: pr.method,
            exercise_id: pr.exercise_id.to_string(),
            workout_exercise_id: pr.workout_exercise_id.map(|id| id.to_string()),
        }
    }
}

impl From<&OneRepMaxHistory> for OneRepMaxHistoryRecord {
    fn from(h: &OneRepMaxHistory) -> Self {
        OneRepMaxHistoryRecord {
            id: h.id,
            estimated_max: h.estimated_max,
            date: h.date,
            source: h.source,
            method: h.method,
            confidence: h.confidence,
            exercise_id: h.exercise_id.to_string(),
            personal_record_id: h.personal_record_id.map(|id| id.to_string()),
        }
    }
}

// ============================================================================
// Record -> entity (references already resolved by the importer)
// ============================================================================

impl From<ExerciseRecord> for Exercise {
    fn from(r: ExerciseRecord) -> Self {
        Exercise {
            id: r.id,
            name: r.name,
            primary_muscle: r.primary_muscle,
            secondary_muscles: r.secondary_muscles,
            equipment: r.equipment,
            exercise_type: r.exercise_type,
            is_compound: r.is_compound,
            instructions: r.instructions,
        }
    }
}

impl From<UserProfileRecord> for UserProfile {
    fn from(r: UserProfileRecord) -> Self {
        UserProfile {
            id: r.id,
            display_name: r.name,
            weight_unit: r.weight_unit,
            experience_level: r.experience_level,
            workout_days_per_week: r.workout_days_per_week,
            goals: r.goals,
            equipment: r.equipment,
        }
    }
}

impl SetRecord {
    pub(crate) fn into_set(self, workout_exercise_id: Uuid) -> ExerciseSet {
        ExerciseSet {
            id: self.id,
            workout_exercise_id,
            set_number: self.set_number,
            weight: self.weight,
            reps: self.reps,
            completed: self.is_completed,
            rpe: self.rpe,
            rest_seconds: self.rest_time,
            notes: self.notes,
            duration_seconds: self.duration,
            distance: self.distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_list_drops_bad_sets() {
        let json = r#"{
            "id": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a01",
            "orderIndex": 0,
            "restTime": 90,
            "exerciseId": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a02",
            "sets": [
                {"id": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a03", "setNumber": 1, "weight": 60.0, "reps": 8},
                {"id": "not-a-uuid", "setNumber": 2, "weight": 60.0, "reps": 8},
                {"setNumber": 3}
            ]
        }"#;

        let record: WorkoutExerciseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sets.len(), 1);
        assert_eq!(record.sets.dropped, 2);
        assert!(!record.sets[0].is_completed);
    }

    #[test]
    fn test_nested_drops_counted_per_workout() {
        let json = r#"{
            "id": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a10",
            "name": "Legs",
            "date": "2024-05-01T07:00:00Z",
            "exercises": [
                {"id": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a11", "orderIndex": 0, "restTime": 90,
                 "exerciseId": "6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a02",
                 "sets": [{"setNumber": 1}]},
                {"orderIndex": "first"}
            ]
        }"#;

        let record: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.exercises.len(), 1);
        assert_eq!(record.dropped_nested(), 2);

        // Serializes back as a plain list
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["exercises"].is_array());
        assert_eq!(value["exercises"][0]["sets"], serde_json::json!([]));
    }

    #[test]
    fn test_parse_ref() {
        assert!(parse_ref(" 6f1c2a9e-4b7d-4c1e-9a3f-2d5b8e7c1a01 ").is_some());
        assert!(parse_ref("bench").is_none());
    }
}
