//! In-memory entity store.
//!
//! Each entity kind lives in its own map keyed by id. Ownership is expressed
//! by an owner id on the child: a [`WorkoutExercise`] names its workout and an
//! [`ExerciseSet`] names its workout exercise. Cascades are performed here,
//! never left to the persistence layer.
//!
//! All mutation goes through `&mut self`, so any holder of `&EntityStore`
//! observes a consistent snapshot.

use crate::{
    EntityCounts, Error, Exercise, ExerciseSet, OneRepMaxHistory, PersonalRecord, Result,
    UserProfile, Workout, WorkoutExercise,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// The persisted object graph
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityStore {
    #[serde(default)]
    exercises: BTreeMap<Uuid, Exercise>,
    #[serde(default)]
    workouts: BTreeMap<Uuid, Workout>,
    #[serde(default)]
    workout_exercises: BTreeMap<Uuid, WorkoutExercise>,
    #[serde(default)]
    sets: BTreeMap<Uuid, ExerciseSet>,
    #[serde(default)]
    personal_records: BTreeMap<Uuid, PersonalRecord>,
    #[serde(default)]
    history: BTreeMap<Uuid, OneRepMaxHistory>,
    #[serde(default)]
    profiles: BTreeMap<Uuid, UserProfile>,
}

/// A broken structural rule found by [`EntityStore::integrity_violations`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Workout exercise whose owning workout is gone
    OrphanedWorkoutExercise(Uuid),
    /// Set whose owning workout exercise is gone
    OrphanedSet(Uuid),
    /// Entity pointing at an exercise that does not exist
    DanglingExercise { kind: &'static str, id: Uuid },
    /// Personal record pointing at a missing workout exercise
    DanglingWorkoutExercise(Uuid),
    /// History entry pointing at a missing personal record
    DanglingPersonalRecord(Uuid),
    /// Set numbers of a workout exercise are not 1..N
    NonContiguousSets(Uuid),
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::OrphanedWorkoutExercise(id) => {
                write!(f, "workout exercise {} has no owning workout", id)
            }
            IntegrityViolation::OrphanedSet(id) => {
                write!(f, "set {} has no owning workout exercise", id)
            }
            IntegrityViolation::DanglingExercise { kind, id } => {
                write!(f, "{} {} references a missing exercise", kind, id)
            }
            IntegrityViolation::DanglingWorkoutExercise(id) => {
                write!(f, "personal record {} references a missing workout exercise", id)
            }
            IntegrityViolation::DanglingPersonalRecord(id) => {
                write!(f, "history entry {} references a missing personal record", id)
            }
            IntegrityViolation::NonContiguousSets(id) => {
                write!(f, "workout exercise {} has non-contiguous set numbers", id)
            }
        }
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            exercises: self.exercises.len(),
            workouts: self.workouts.len(),
            workout_exercises: self.workout_exercises.len(),
            sets: self.sets.len(),
            personal_records: self.personal_records.len(),
            history: self.history.len(),
            profiles: self.profiles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    pub fn exercise(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.get(&id)
    }

    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values()
    }

    /// Case-insensitive catalog lookup
    pub fn exercise_by_name(&self, name: &str) -> Option<&Exercise> {
        let needle = name.trim().to_lowercase();
        self.exercises
            .values()
            .find(|e| e.name.to_lowercase() == needle)
    }

    pub fn exercise_mut(&mut self, id: Uuid) -> Option<&mut Exercise> {
        self.exercises.get_mut(&id)
    }

    pub fn workout(&self, id: Uuid) -> Option<&Workout> {
        self.workouts.get(&id)
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.values()
    }

    pub fn workout_exercise(&self, id: Uuid) -> Option<&WorkoutExercise> {
        self.workout_exercises.get(&id)
    }

    pub fn workout_exercises(&self) -> impl Iterator<Item = &WorkoutExercise> {
        self.workout_exercises.values()
    }

    /// Exercise entries of a workout, in order
    pub fn workout_exercises_of(&self, workout_id: Uuid) -> Vec<&WorkoutExercise> {
        let mut entries: Vec<_> = self
            .workout_exercises
            .values()
            .filter(|we| we.workout_id == workout_id)
            .collect();
        entries.sort_by_key(|we| we.order_index);
        entries
    }

    pub fn set(&self, id: Uuid) -> Option<&ExerciseSet> {
        self.sets.get(&id)
    }

    pub fn sets(&self) -> impl Iterator<Item = &ExerciseSet> {
        self.sets.values()
    }

    /// Sets of a workout exercise, ordered by set number
    pub fn sets_of(&self, workout_exercise_id: Uuid) -> Vec<&ExerciseSet> {
        let mut sets: Vec<_> = self
            .sets
            .values()
            .filter(|s| s.workout_exercise_id == workout_exercise_id)
            .collect();
        sets.sort_by_key(|s| s.set_number);
        sets
    }

    pub fn personal_record(&self, id: Uuid) -> Option<&PersonalRecord> {
        self.personal_records.get(&id)
    }

    pub fn personal_records(&self) -> impl Iterator<Item = &PersonalRecord> {
        self.personal_records.values()
    }

    pub fn history_entry(&self, id: Uuid) -> Option<&OneRepMaxHistory> {
        self.history.get(&id)
    }

    pub fn history_entries(&self) -> impl Iterator<Item = &OneRepMaxHistory> {
        self.history.values()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &UserProfile> {
        self.profiles.values()
    }

    /// The meaningful profile, if one exists
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profiles.values().next()
    }

    /// Number of entities holding a reference to the exercise
    pub fn exercise_reference_count(&self, exercise_id: Uuid) -> usize {
        self.workout_exercises
            .values()
            .filter(|we| we.exercise_id == exercise_id)
            .count()
            + self
                .personal_records
                .values()
                .filter(|pr| pr.exercise_id == exercise_id)
                .count()
            + self
                .history
                .values()
                .filter(|h| h.exercise_id == exercise_id)
                .count()
    }

    pub fn personal_record_ids(&self) -> Vec<Uuid> {
        self.personal_records.keys().copied().collect()
    }

    pub fn history_ids(&self) -> Vec<Uuid> {
        self.history.keys().copied().collect()
    }

    pub fn workout_ids(&self) -> Vec<Uuid> {
        self.workouts.keys().copied().collect()
    }

    pub fn profile_ids(&self) -> Vec<Uuid> {
        self.profiles.keys().copied().collect()
    }

    pub fn exercise_ids(&self) -> Vec<Uuid> {
        self.exercises.keys().copied().collect()
    }

    // ------------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------------

    /// Insert an exercise, replacing any exercise with the same id
    pub fn insert_exercise(&mut self, exercise: Exercise) -> Uuid {
        let id = exercise.id;
        self.exercises.insert(id, exercise);
        id
    }

    /// Delete an exercise that nothing references any more
    pub fn delete_exercise(&mut self, id: Uuid) -> Result<Exercise> {
        let references = self.exercise_reference_count(id);
        if references > 0 {
            return Err(Error::ExerciseInUse { id, references });
        }
        self.exercises.remove(&id).ok_or(Error::UnknownExercise(id))
    }

    // ------------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------------

    pub fn insert_workout(&mut self, workout: Workout) -> Uuid {
        let id = workout.id;
        self.workouts.insert(id, workout);
        id
    }

    /// Delete a workout together with its exercise entries and their sets
    pub fn delete_workout(&mut self, id: Uuid) -> Result<Workout> {
        let workout = self.workouts.remove(&id).ok_or(Error::UnknownWorkout(id))?;

        let owned: Vec<Uuid> = self
            .workout_exercises
            .values()
            .filter(|we| we.workout_id == id)
            .map(|we| we.id)
            .collect();
        for we_id in &owned {
            self.drop_workout_exercise(*we_id);
        }

        tracing::debug!(
            "Deleted workout {} with {} exercise entries",
            id,
            owned.len()
        );
        Ok(workout)
    }

    /// Append an exercise entry to a workout
    pub fn add_workout_exercise(
        &mut self,
        workout_id: Uuid,
        exercise_id: Uuid,
        rest_seconds: u32,
    ) -> Result<Uuid> {
        let order_index = self.workout_exercises_of(workout_id).len() as u32;
        self.insert_workout_exercise(WorkoutExercise {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id,
            order_index,
            rest_seconds,
            notes: None,
        })
    }

    /// Insert a fully specified exercise entry; both owner and exercise must exist
    pub fn insert_workout_exercise(&mut self, entry: WorkoutExercise) -> Result<Uuid> {
        if !self.workouts.contains_key(&entry.workout_id) {
            return Err(Error::UnknownWorkout(entry.workout_id));
        }
        if !self.exercises.contains_key(&entry.exercise_id) {
            return Err(Error::UnknownExercise(entry.exercise_id));
        }
        let id = entry.id;
        self.workout_exercises.insert(id, entry);
        Ok(id)
    }

    /// Remove an exercise entry and its sets, closing the gap in the order
    pub fn remove_workout_exercise(&mut self, id: Uuid) -> Result<WorkoutExercise> {
        let entry = self
            .drop_workout_exercise(id)
            .ok_or(Error::UnknownWorkoutExercise(id))?;

        let mut siblings: Vec<_> = self
            .workout_exercises
            .values_mut()
            .filter(|we| we.workout_id == entry.workout_id)
            .collect();
        siblings.sort_by_key(|we| we.order_index);
        for (index, sibling) in siblings.into_iter().enumerate() {
            sibling.order_index = index as u32;
        }

        Ok(entry)
    }

    /// Remove an entry with its sets and null out record back-links
    fn drop_workout_exercise(&mut self, id: Uuid) -> Option<WorkoutExercise> {
        let entry = self.workout_exercises.remove(&id)?;
        self.sets.retain(|_, s| s.workout_exercise_id != id);
        for pr in self.personal_records.values_mut() {
            if pr.workout_exercise_id == Some(id) {
                pr.workout_exercise_id = None;
            }
        }
        Some(entry)
    }

    // ------------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------------

    /// Append a set to a workout exercise
    pub fn add_set(&mut self, workout_exercise_id: Uuid, weight: f64, reps: u32) -> Result<Uuid> {
        let position = self.sets_of(workout_exercise_id).len() as u32 + 1;
        self.insert_set_at(workout_exercise_id, position, weight, reps)
    }

    /// Insert a set at a 1-based position, shifting later sets down
    pub fn insert_set_at(
        &mut self,
        workout_exercise_id: Uuid,
        position: u32,
        weight: f64,
        reps: u32,
    ) -> Result<Uuid> {
        if !self.workout_exercises.contains_key(&workout_exercise_id) {
            return Err(Error::UnknownWorkoutExercise(workout_exercise_id));
        }

        let position = position.max(1);
        for set in self.sets.values_mut() {
            if set.workout_exercise_id == workout_exercise_id && set.set_number >= position {
                set.set_number += 1;
            }
        }

        let id = Uuid::new_v4();
        self.sets.insert(
            id,
            ExerciseSet {
                id,
                workout_exercise_id,
                set_number: position,
                weight,
                reps,
                completed: false,
                rpe: None,
                rest_seconds: None,
                notes: None,
                duration_seconds: None,
                distance: None,
            },
        );
        self.renumber_sets(workout_exercise_id);
        Ok(id)
    }

    /// Insert a fully specified set; its declared number positions it among siblings
    pub fn insert_set(&mut self, set: ExerciseSet) -> Result<Uuid> {
        let owner = set.workout_exercise_id;
        if !self.workout_exercises.contains_key(&owner) {
            return Err(Error::UnknownWorkoutExercise(owner));
        }
        let id = set.id;
        self.sets.insert(id, set);
        self.renumber_sets(owner);
        Ok(id)
    }

    /// Remove a set and renumber the remaining ones
    pub fn remove_set(&mut self, id: Uuid) -> Result<ExerciseSet> {
        let set = self.sets.remove(&id).ok_or(Error::UnknownSet(id))?;
        self.renumber_sets(set.workout_exercise_id);
        Ok(set)
    }

    /// Edit a set's performance fields; identity, owner and number are kept
    pub fn edit_set<F>(&mut self, id: Uuid, f: F) -> Result<&ExerciseSet>
    where
        F: FnOnce(&mut ExerciseSet),
    {
        let set = self.sets.get_mut(&id).ok_or(Error::UnknownSet(id))?;
        let (owner, number) = (set.workout_exercise_id, set.set_number);
        f(set);
        set.id = id;
        set.workout_exercise_id = owner;
        set.set_number = number;
        Ok(set)
    }

    pub fn complete_set(&mut self, id: Uuid) -> Result<&ExerciseSet> {
        self.edit_set(id, |s| s.completed = true)
    }

    /// Reassign set numbers 1..N in current order
    fn renumber_sets(&mut self, workout_exercise_id: Uuid) {
        let mut ordered: Vec<(u32, Uuid)> = self
            .sets
            .values()
            .filter(|s| s.workout_exercise_id == workout_exercise_id)
            .map(|s| (s.set_number, s.id))
            .collect();
        ordered.sort_by_key(|(number, _)| *number);
        for (index, (_, id)) in ordered.into_iter().enumerate() {
            if let Some(set) = self.sets.get_mut(&id) {
                set.set_number = index as u32 + 1;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Records and history
    // ------------------------------------------------------------------------

    pub fn insert_personal_record(&mut self, record: PersonalRecord) -> Result<Uuid> {
        if !self.exercises.contains_key(&record.exercise_id) {
            return Err(Error::UnknownExercise(record.exercise_id));
        }
        if let Some(we_id) = record.workout_exercise_id {
            if !self.workout_exercises.contains_key(&we_id) {
                return Err(Error::UnknownWorkoutExercise(we_id));
            }
        }
        let id = record.id;
        self.personal_records.insert(id, record);
        Ok(id)
    }

    /// Delete a personal record; history entries it produced lose their link
    pub fn delete_personal_record(&mut self, id: Uuid) -> Option<PersonalRecord> {
        let record = self.personal_records.remove(&id)?;
        for entry in self.history.values_mut() {
            if entry.personal_record_id == Some(id) {
                entry.personal_record_id = None;
            }
        }
        Some(record)
    }

    pub fn insert_history(&mut self, entry: OneRepMaxHistory) -> Result<Uuid> {
        if !self.exercises.contains_key(&entry.exercise_id) {
            return Err(Error::UnknownExercise(entry.exercise_id));
        }
        if let Some(pr_id) = entry.personal_record_id {
            if !self.personal_records.contains_key(&pr_id) {
                return Err(Error::UnknownPersonalRecord(pr_id));
            }
        }
        let id = entry.id;
        self.history.insert(id, entry);
        Ok(id)
    }

    pub fn delete_history_entry(&mut self, id: Uuid) -> Option<OneRepMaxHistory> {
        self.history.remove(&id)
    }

    // ------------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------------

    pub fn insert_profile(&mut self, profile: UserProfile) -> Uuid {
        let id = profile.id;
        self.profiles.insert(id, profile);
        id
    }

    /// Make `profile` the single profile of this installation
    pub fn set_profile(&mut self, profile: UserProfile) -> Uuid {
        self.profiles.clear();
        self.insert_profile(profile)
    }

    pub fn delete_profile(&mut self, id: Uuid) -> Option<UserProfile> {
        self.profiles.remove(&id)
    }

    // ------------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------------

    /// Remove workout exercises without a workout and sets without a workout
    /// exercise. Returns `(workout_exercises, sets)` removed.
    pub fn purge_orphans(&mut self) -> (usize, usize) {
        let before = self.sets.len();
        let orphaned: Vec<Uuid> = self
            .workout_exercises
            .values()
            .filter(|we| !self.workouts.contains_key(&we.workout_id))
            .map(|we| we.id)
            .collect();
        for id in &orphaned {
            self.drop_workout_exercise(*id);
        }

        let owners: HashSet<Uuid> = self.workout_exercises.keys().copied().collect();
        self.sets
            .retain(|_, s| owners.contains(&s.workout_exercise_id));

        (orphaned.len(), before - self.sets.len())
    }

    /// Every structural rule currently broken
    pub fn integrity_violations(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();

        for we in self.workout_exercises.values() {
            if !self.workouts.contains_key(&we.workout_id) {
                violations.push(IntegrityViolation::OrphanedWorkoutExercise(we.id));
            }
            if !self.exercises.contains_key(&we.exercise_id) {
                violations.push(IntegrityViolation::DanglingExercise {
                    kind: "workout exercise",
                    id: we.id,
                });
            }
            let numbers: Vec<u32> = self.sets_of(we.id).iter().map(|s| s.set_number).collect();
            if numbers.iter().enumerate().any(|(i, n)| *n != i as u32 + 1) {
                violations.push(IntegrityViolation::NonContiguousSets(we.id));
            }
        }

        for set in self.sets.values() {
            if !self.workout_exercises.contains_key(&set.workout_exercise_id) {
                violations.push(IntegrityViolation::OrphanedSet(set.id));
            }
        }

        for pr in self.personal_records.values() {
            if !self.exercises.contains_key(&pr.exercise_id) {
                violations.push(IntegrityViolation::DanglingExercise {
                    kind: "personal record",
                    id: pr.id,
                });
            }
            if let Some(we_id) = pr.workout_exercise_id {
                if !self.workout_exercises.contains_key(&we_id) {
                    violations.push(IntegrityViolation::DanglingWorkoutExercise(pr.id));
                }
            }
        }

        for entry in self.history.values() {
            if !self.exercises.contains_key(&entry.exercise_id) {
                violations.push(IntegrityViolation::DanglingExercise {
                    kind: "history entry",
                    id: entry.id,
                });
            }
            if let Some(pr_id) = entry.personal_record_id {
                if !self.personal_records.contains_key(&pr_id) {
                    violations.push(IntegrityViolation::DanglingPersonalRecord(entry.id));
                }
            }
        }

        violations
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{ExerciseType, MuscleGroup};
    use chrono::Utc;

    /// Store with one exercise and one workout holding one entry with `sets` sets
    pub(crate) fn store_with_workout(sets: u32) -> (EntityStore, Uuid, Uuid) {
        let mut store = EntityStore::new();
        let squat = store.insert_exercise(Exercise::new(
            "Back Squat",
            MuscleGroup::Quadriceps,
            ExerciseType::Strength,
        ));
        let workout = store.insert_workout(Workout::new("Leg Day", Utc::now()));
        let entry = store.add_workout_exercise(workout, squat, 120).unwrap();
        for i in 0..sets {
            store.add_set(entry, 100.0 + i as f64 * 5.0, 5).unwrap();
        }
        (store, workout, entry)
    }

    fn set_numbers(store: &EntityStore, entry: Uuid) -> Vec<u32> {
        store.sets_of(entry).iter().map(|s| s.set_number).collect()
    }

    #[test]
    fn test_add_sets_numbers_contiguously() {
        let (store, _, entry) = store_with_workout(3);
        assert_eq!(set_numbers(&store, entry), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_set_renumbers() {
        let (mut store, _, entry) = store_with_workout(4);
        let second = store.sets_of(entry)[1].id;

        store.remove_set(second).unwrap();

        assert_eq!(set_numbers(&store, entry), vec![1, 2, 3]);
        assert!(store.set(second).is_none());
    }

    #[test]
    fn test_insert_set_at_shifts_later_sets() {
        let (mut store, _, entry) = store_with_workout(2);
        let first_weight = store.sets_of(entry)[0].weight;

        let inserted = store.insert_set_at(entry, 1, 60.0, 10).unwrap();

        let sets = store.sets_of(entry);
        assert_eq!(set_numbers(&store, entry), vec![1, 2, 3]);
        assert_eq!(sets[0].id, inserted);
        assert_eq!(sets[1].weight, first_weight);
    }

    #[test]
    fn test_edit_set_keeps_identity() {
        let (mut store, _, entry) = store_with_workout(2);
        let id = store.sets_of(entry)[0].id;

        store
            .edit_set(id, |s| {
                s.set_number = 9;
                s.weight = 140.0;
                s.completed = true;
            })
            .unwrap();

        let set = store.set(id).unwrap();
        assert_eq!(set.set_number, 1);
        assert_eq!(set.weight, 140.0);
        assert!(set.completed);
    }

    #[test]
    fn test_delete_workout_cascades() {
        let (mut store, workout, _) = store_with_workout(3);

        store.delete_workout(workout).unwrap();

        let counts = store.counts();
        assert_eq!(counts.workouts, 0);
        assert_eq!(counts.workout_exercises, 0);
        assert_eq!(counts.sets, 0);
        assert_eq!(counts.exercises, 1);
        assert!(store.integrity_violations().is_empty());
    }

    #[test]
    fn test_workout_exercise_requires_existing_exercise() {
        let (mut store, workout, _) = store_with_workout(0);
        let missing = Uuid::new_v4();

        let result = store.add_workout_exercise(workout, missing, 90);
        assert!(matches!(result, Err(Error::UnknownExercise(id)) if id == missing));
    }

    #[test]
    fn test_delete_exercise_refused_while_referenced() {
        let (mut store, workout, entry) = store_with_workout(1);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;

        let result = store.delete_exercise(exercise_id);
        assert!(matches!(result, Err(Error::ExerciseInUse { references: 1, .. })));

        store.delete_workout(workout).unwrap();
        store.delete_exercise(exercise_id).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_workout_exercise_reindexes_siblings() {
        let (mut store, workout, first) = store_with_workout(2);
        let bench = store.insert_exercise(Exercise::new(
            "Bench Press",
            MuscleGroup::Chest,
            ExerciseType::Strength,
        ));
        let second = store.add_workout_exercise(workout, bench, 90).unwrap();
        assert_eq!(store.workout_exercise(second).unwrap().order_index, 1);

        store.remove_workout_exercise(first).unwrap();

        assert_eq!(store.workout_exercise(second).unwrap().order_index, 0);
        assert_eq!(store.counts().sets, 0);
    }

    #[test]
    fn test_purge_orphans_and_violations() {
        let (store, _, entry) = store_with_workout(2);

        // Simulate a store file written without its workouts
        let mut json = serde_json::to_value(&store).unwrap();
        json["workouts"] = serde_json::json!({});
        let mut broken: EntityStore = serde_json::from_value(json).unwrap();

        let violations = broken.integrity_violations();
        assert!(violations.contains(&IntegrityViolation::OrphanedWorkoutExercise(entry)));

        let (entries, sets) = broken.purge_orphans();
        assert_eq!((entries, sets), (1, 2));
        assert!(broken.integrity_violations().is_empty());
    }

    #[test]
    fn test_exercise_lookup_is_case_insensitive() {
        let (store, _, _) = store_with_workout(0);
        assert!(store.exercise_by_name("back squat").is_some());
        assert!(store.exercise_by_name("  BACK SQUAT ").is_some());
        assert!(store.exercise_by_name("front squat").is_none());
    }

    #[test]
    fn test_history_with_unknown_record_rejected() {
        let (mut store, _, entry) = store_with_workout(0);
        let exercise_id = store.workout_exercise(entry).unwrap().exercise_id;
        let missing = Uuid::new_v4();

        let result = store.insert_history(OneRepMaxHistory {
            id: Uuid::new_v4(),
            exercise_id,
            estimated_max: 120.0,
            date: Utc::now(),
            source: crate::MaxSource::Manual,
            method: crate::FormulaMethod::Epley,
            confidence: crate::Confidence::High,
            personal_record_id: Some(missing),
        });

        assert!(matches!(result, Err(Error::UnknownPersonalRecord(id)) if id == missing));
        assert_eq!(store.counts().history, 0);
    }
}
