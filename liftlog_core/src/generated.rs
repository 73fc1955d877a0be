//! Validation of externally generated workouts.
//!
//! Workout generators (LLM-backed or otherwise) are untrusted producers of
//! `(name, muscle group, rest time, sets)` tuples. A candidate is matched
//! against the live catalog and structurally validated before anything is
//! written; only [`ValidatedWorkout::materialize`] touches the store.

use crate::{EntityStore, Error, ExerciseType, MuscleGroup, Result, Workout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Allowed number of exercises in a generated workout
pub const EXERCISE_COUNT: RangeInclusive<usize> = 4..=8;

/// Allowed number of sets per generated exercise
pub const SET_COUNT: RangeInclusive<usize> = 3..=4;

/// Candidate workout as produced by a generator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWorkout {
    pub name: String,
    pub exercises: Vec<GeneratedExercise>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    pub name: String,
    pub primary_muscle: Option<MuscleGroup>,
    pub exercise_type: Option<ExerciseType>,
    pub rest_seconds: u32,
    pub sets: Vec<GeneratedSet>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSet {
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
}

impl GeneratedWorkout {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A candidate that passed validation, bound to catalog exercises
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedWorkout {
    pub name: String,
    pub exercises: Vec<ValidatedExercise>,
    /// Generated names with no catalog match
    pub dropped: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedExercise {
    pub exercise_id: Uuid,
    pub rest_seconds: u32,
    pub sets: Vec<GeneratedSet>,
}

/// Match a candidate against the catalog and check its structure
///
/// Names are matched exactly. Unmatched exercises are dropped with a warning;
/// the remainder must have 4–8 exercises of 3–4 sets each, otherwise the
/// whole candidate is rejected with [`Error::InvalidWorkout`].
pub fn validate_generated(candidate: &GeneratedWorkout, store: &EntityStore) -> Result<ValidatedWorkout> {
    if candidate.name.trim().is_empty() {
        return Err(Error::InvalidWorkout("workout has no name".into()));
    }

    let mut exercises = Vec::new();
    let mut dropped = Vec::new();

    for generated in &candidate.exercises {
        let Some(exercise) = store.exercises().find(|e| e.name == generated.name) else {
            tracing::warn!("Generated exercise '{}' not in catalog, dropping", generated.name);
            dropped.push(generated.name.clone());
            continue;
        };

        if !SET_COUNT.contains(&generated.sets.len()) {
            return Err(Error::InvalidWorkout(format!(
                "'{}' has {} sets, expected {}-{}",
                generated.name,
                generated.sets.len(),
                SET_COUNT.start(),
                SET_COUNT.end()
            )));
        }
        if let Some(set) = generated.sets.iter().find(|s| s.reps == 0 || s.weight < 0.0) {
            return Err(Error::InvalidWorkout(format!(
                "'{}' has an implausible set target ({} reps at {})",
                generated.name, set.reps, set.weight
            )));
        }

        exercises.push(ValidatedExercise {
            exercise_id: exercise.id,
            rest_seconds: generated.rest_seconds,
            sets: generated.sets.clone(),
        });
    }

    if !EXERCISE_COUNT.contains(&exercises.len()) {
        return Err(Error::InvalidWorkout(format!(
            "{} usable exercises, expected {}-{}",
            exercises.len(),
            EXERCISE_COUNT.start(),
            EXERCISE_COUNT.end()
        )));
    }

    Ok(ValidatedWorkout {
        name: candidate.name.trim().to_string(),
        exercises,
        dropped,
    })
}

impl ValidatedWorkout {
    /// Create the workout, its entries and planned sets. Returns the workout id.
    pub fn materialize(&self, store: &mut EntityStore, date: DateTime<Utc>) -> Result<Uuid> {
        for exercise in &self.exercises {
            if store.exercise(exercise.exercise_id).is_none() {
                return Err(Error::UnknownExercise(exercise.exercise_id));
            }
        }

        let workout_id = store.insert_workout(Workout::new(self.name.clone(), date));
        for exercise in &self.exercises {
            let entry = store.add_workout_exercise(workout_id, exercise.exercise_id, exercise.rest_seconds)?;
            for set in &exercise.sets {
                store.add_set(entry, set.weight, set.reps)?;
            }
        }

        tracing::info!(
            "Created workout '{}' with {} exercises",
            self.name,
            self.exercises.len()
        );
        Ok(workout_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_seed, sync_catalog};

    fn catalog_store() -> EntityStore {
        let mut store = EntityStore::new();
        sync_catalog(&mut store, default_seed());
        store
    }

    fn generated(name: &str, sets: usize) -> GeneratedExercise {
        GeneratedExercise {
            name: name.into(),
            primary_muscle: None,
            exercise_type: Some(ExerciseType::Strength),
            rest_seconds: 90,
            sets: vec![GeneratedSet { reps: 8, weight: 40.0 }; sets],
        }
    }

    fn candidate(names: &[&str]) -> GeneratedWorkout {
        GeneratedWorkout {
            name: "Upper A".into(),
            exercises: names.iter().map(|n| generated(n, 3)).collect(),
        }
    }

    const UPPER: [&str; 4] = [
        "Barbell Bench Press",
        "Barbell Row",
        "Overhead Press",
        "Pull-up",
    ];

    #[test]
    fn test_valid_candidate_materializes() {
        let mut store = catalog_store();
        let validated = validate_generated(&candidate(&UPPER), &store).unwrap();
        assert!(validated.dropped.is_empty());

        let workout_id = validated.materialize(&mut store, Utc::now()).unwrap();

        let entries = store.workout_exercises_of(workout_id);
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| store.sets_of(e.id).len() == 3));
        assert!(store.integrity_violations().is_empty());
    }

    #[test]
    fn test_unknown_names_dropped() {
        let store = catalog_store();
        let mut names = UPPER.to_vec();
        names.push("Quantum Curl");

        let validated = validate_generated(&candidate(&names), &store).unwrap();

        assert_eq!(validated.exercises.len(), 4);
        assert_eq!(validated.dropped, vec!["Quantum Curl".to_string()]);
    }

    #[test]
    fn test_name_match_is_exact() {
        let store = catalog_store();
        let names = ["barbell bench press", "Barbell Row", "Overhead Press", "Pull-up"];

        let result = validate_generated(&candidate(&names), &store);
        assert!(matches!(result, Err(Error::InvalidWorkout(_))));
    }

    #[test]
    fn test_too_few_or_too_many_exercises_rejected() {
        let store = catalog_store();
        assert!(validate_generated(&candidate(&UPPER[..3]), &store).is_err());

        let all: Vec<&str> = default_seed().iter().map(|s| s.name.as_str()).take(9).collect();
        let result = validate_generated(&candidate(&all), &store);
        assert!(matches!(result, Err(Error::InvalidWorkout(_))));
    }

    #[test]
    fn test_bad_set_count_rejected() {
        let store = catalog_store();
        let mut workout = candidate(&UPPER);
        workout.exercises[2] = generated("Overhead Press", 5);

        let result = validate_generated(&workout, &store);

        assert!(matches!(result, Err(Error::InvalidWorkout(_))));
        // Nothing was written
        assert_eq!(store.counts().workouts, 0);
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{
            "name": "Legs",
            "exercises": [
                {"name": "Leg Press", "primaryMuscle": "quadriceps", "exerciseType": "strength",
                 "restSeconds": 120, "sets": [{"reps": 10, "weight": 100}, {"reps": 10}, {"reps": 8, "weight": 110}]}
            ]
        }"#;
        let workout = GeneratedWorkout::from_json(raw).unwrap();
        assert_eq!(workout.exercises[0].sets.len(), 3);
        assert_eq!(workout.exercises[0].sets[1].weight, 0.0);
    }
}
