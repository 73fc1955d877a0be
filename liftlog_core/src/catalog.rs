//! Built-in exercise catalog seed.
//!
//! The seed is loaded once and synced into the store by name: missing
//! exercises are created, existing ones updated in place. Exercises that fall
//! out of the seed are never removed, since workouts and history may still
//! reference them.

use crate::types::*;
use crate::EntityStore;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One catalog definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSeed {
    pub id: Uuid,
    pub name: String,
    pub instructions: Option<String>,
    pub primary_muscle: MuscleGroup,
    #[serde(default)]
    pub secondary_muscles: Vec<MuscleGroup>,
    pub equipment: Option<Equipment>,
    pub exercise_type: ExerciseType,
    pub is_compound: bool,
}

impl ExerciseSeed {
    fn apply_to(&self, exercise: &mut Exercise) {
        exercise.name = self.name.clone();
        exercise.instructions = self.instructions.clone();
        exercise.primary_muscle = self.primary_muscle;
        exercise.secondary_muscles = self.secondary_muscles.clone();
        exercise.equipment = self.equipment;
        exercise.exercise_type = self.exercise_type;
        exercise.is_compound = self.is_compound;
    }

    fn to_exercise(&self, id: Uuid) -> Exercise {
        let mut exercise = Exercise::new(self.name.clone(), self.primary_muscle, self.exercise_type);
        exercise.id = id;
        self.apply_to(&mut exercise);
        exercise
    }
}

/// What a catalog sync changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Cached default seed - built once and reused
static DEFAULT_SEED: Lazy<Vec<ExerciseSeed>> = Lazy::new(build_default_seed);

/// Get a reference to the cached default seed
pub fn default_seed() -> &'static [ExerciseSeed] {
    &DEFAULT_SEED
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: u128,
    name: &str,
    primary_muscle: MuscleGroup,
    secondary_muscles: &[MuscleGroup],
    equipment: Option<Equipment>,
    exercise_type: ExerciseType,
    is_compound: bool,
    instructions: &str,
) -> ExerciseSeed {
    ExerciseSeed {
        id: Uuid::from_u128(id),
        name: name.into(),
        instructions: Some(instructions.into()),
        primary_muscle,
        secondary_muscles: secondary_muscles.to_vec(),
        equipment,
        exercise_type,
        is_compound,
    }
}

fn build_default_seed() -> Vec<ExerciseSeed> {
    use Equipment::*;
    use ExerciseType::*;
    use MuscleGroup::*;

    vec![
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000001,
            "Barbell Back Squat",
            Quadriceps,
            &[Glutes, Hamstrings, Core],
            Some(Barbell),
            Strength,
            true,
            "Bar on upper back, sit down between the heels, drive up through mid-foot.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000002,
            "Barbell Bench Press",
            Chest,
            &[Triceps, Shoulders],
            Some(Barbell),
            Strength,
            true,
            "Lower the bar to mid-chest with elbows tucked, press back to lockout.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000003,
            "Conventional Deadlift",
            Hamstrings,
            &[Glutes, Back, Forearms],
            Some(Barbell),
            Strength,
            true,
            "Hinge to the bar, brace, push the floor away and lock hips and knees together.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000004,
            "Overhead Press",
            Shoulders,
            &[Triceps, Core],
            Some(Barbell),
            Strength,
            true,
            "Press from the front rack to overhead, moving the head through at the top.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000005,
            "Barbell Row",
            Back,
            &[Biceps, Forearms],
            Some(Barbell),
            Strength,
            true,
            "Hinge to roughly 45 degrees and pull the bar to the lower ribs.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000006,
            "Pull-up",
            Back,
            &[Biceps],
            Some(Bodyweight),
            Strength,
            true,
            "From a dead hang, pull until the chin clears the bar.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000007,
            "Dumbbell Curl",
            Biceps,
            &[Forearms],
            Some(Dumbbell),
            Strength,
            false,
            "Curl without swinging, elbows pinned to the sides.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000008,
            "Cable Triceps Pushdown",
            Triceps,
            &[],
            Some(Cable),
            Strength,
            false,
            "Elbows fixed at the sides, extend fully and control the return.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_000000000009,
            "Leg Press",
            Quadriceps,
            &[Glutes],
            Some(Machine),
            Strength,
            true,
            "Lower the sled until hips start to tuck, press without locking the knees hard.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_00000000000a,
            "Romanian Deadlift",
            Hamstrings,
            &[Glutes, Back],
            Some(Barbell),
            Strength,
            true,
            "Soft knees, push the hips back until the hamstrings stop you.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_00000000000b,
            "Standing Calf Raise",
            Calves,
            &[],
            Some(Machine),
            Strength,
            false,
            "Full stretch at the bottom, pause at the top.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_00000000000c,
            "Plank",
            Core,
            &[Shoulders],
            Some(Bodyweight),
            Flexibility,
            false,
            "Forearms under shoulders, squeeze glutes, hold a straight line.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_00000000000d,
            "Kettlebell Swing",
            Glutes,
            &[Hamstrings, Core],
            Some(Kettlebell),
            Plyometric,
            true,
            "Hike the bell back, snap the hips, let it float to chest height.",
        ),
        seed(
            0x6c1d0a52_3e4f_4b01_9a00_00000000000e,
            "Rowing Machine",
            MuscleGroup::Cardio,
            &[Back, Quadriceps],
            Some(Machine),
            ExerciseType::Cardio,
            false,
            "Legs, hips, arms on the drive; reverse on the recovery.",
        ),
    ]
}

/// Check a seed list for duplicate ids or names and empty names
pub fn validate(seeds: &[ExerciseSeed]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for seed in seeds {
        if seed.name.trim().is_empty() {
            errors.push(format!("Seed {} has empty name", seed.id));
        }
        if !ids.insert(seed.id) {
            errors.push(format!("Duplicate seed id {}", seed.id));
        }
        if !names.insert(seed.name.to_lowercase()) {
            errors.push(format!("Duplicate seed name '{}'", seed.name));
        }
    }

    errors
}

/// Sync seeds into the store by case-insensitive name
///
/// New exercises take the seed id unless another exercise already holds it.
pub fn sync_catalog(store: &mut EntityStore, seeds: &[ExerciseSeed]) -> SeedReport {
    let mut report = SeedReport::default();

    for seed in seeds {
        let existing = store.exercise_by_name(&seed.name).map(|e| e.id);
        match existing {
            Some(id) => {
                let Some(exercise) = store.exercise_mut(id) else {
                    continue;
                };
                let before = exercise.clone();
                seed.apply_to(exercise);
                if *exercise == before {
                    report.unchanged += 1;
                } else {
                    tracing::debug!("Updated catalog exercise '{}'", seed.name);
                    report.updated += 1;
                }
            }
            None => {
                let id = if store.exercise(seed.id).is_some() {
                    Uuid::new_v4()
                } else {
                    seed.id
                };
                store.insert_exercise(seed.to_exercise(id));
                report.created += 1;
            }
        }
    }

    tracing::info!(
        "Catalog sync: {} created, {} updated, {} unchanged",
        report.created,
        report.updated,
        report.unchanged
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_validates() {
        let errors = validate(default_seed());
        assert!(errors.is_empty(), "Default seed has errors: {:?}", errors);
        assert!(default_seed().len() >= 10);
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let mut seeds = default_seed()[..2].to_vec();
        seeds.push(seeds[0].clone());
        seeds[1].name = "barbell back squat".into();

        let errors = validate(&seeds);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_sync_creates_then_leaves_unchanged() {
        let mut store = EntityStore::new();

        let first = sync_catalog(&mut store, default_seed());
        assert_eq!(first.created, default_seed().len());
        assert_eq!(store.counts().exercises, default_seed().len());
        assert!(store.exercise(default_seed()[0].id).is_some());

        let second = sync_catalog(&mut store, default_seed());
        assert_eq!(second.created, 0);
        assert_eq!(second.unchanged, default_seed().len());
    }

    #[test]
    fn test_sync_updates_by_name_and_keeps_id() {
        let mut store = EntityStore::new();
        let mut custom = Exercise::new("barbell bench press", MuscleGroup::Shoulders, ExerciseType::Strength);
        custom.is_compound = false;
        let custom_id = store.insert_exercise(custom);

        let report = sync_catalog(&mut store, &default_seed()[1..2]);

        assert_eq!(report.updated, 1);
        let exercise = store.exercise(custom_id).unwrap();
        assert_eq!(exercise.name, "Barbell Bench Press");
        assert_eq!(exercise.primary_muscle, MuscleGroup::Chest);
        assert!(exercise.is_compound);
    }

    #[test]
    fn test_sync_never_removes() {
        let mut store = EntityStore::new();
        store.insert_exercise(Exercise::new("Sled Push", MuscleGroup::FullBody, ExerciseType::Cardio));

        sync_catalog(&mut store, default_seed());

        assert!(store.exercise_by_name("Sled Push").is_some());
        assert_eq!(store.counts().exercises, default_seed().len() + 1);
    }

    #[test]
    fn test_sync_avoids_taken_seed_id() {
        let mut store = EntityStore::new();
        let mut squatter = Exercise::new("Zercher Squat", MuscleGroup::Quadriceps, ExerciseType::Strength);
        squatter.id = default_seed()[0].id;
        store.insert_exercise(squatter);

        sync_catalog(&mut store, &default_seed()[..1]);

        assert_eq!(store.counts().exercises, 2);
        let squat = store.exercise_by_name("Barbell Back Squat").unwrap();
        assert_ne!(squat.id, default_seed()[0].id);
    }
}
