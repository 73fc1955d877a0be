//! Core domain types for liftlog.
//!
//! This module defines the entities held by the [`EntityStore`](crate::EntityStore):
//! - Exercises and their classification tags
//! - Workouts, their exercise entries and sets
//! - Personal records and the estimated-1RM time series
//! - The user profile
//!
//! Owned children carry their owner's id (`workout_id`, `workout_exercise_id`);
//! every other link is a plain non-owning id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Classification Tags
// ============================================================================

/// Muscle group targeted by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Quadriceps,
    Hamstrings,
    Glutes,
    Calves,
    FullBody,
    Cardio,
}

/// Equipment an exercise needs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Cable,
    Bodyweight,
    Band,
    Other,
}

/// Broad kind of exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
    Plyometric,
}

// ============================================================================
// Tracking Tags
// ============================================================================

/// Named 1RM estimation formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormulaMethod {
    Epley,
    Brzycki,
    Lombardi,
    McGlothin,
}

impl FormulaMethod {
    pub const ALL: [FormulaMethod; 4] = [
        FormulaMethod::Epley,
        FormulaMethod::Brzycki,
        FormulaMethod::Lombardi,
        FormulaMethod::McGlothin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormulaMethod::Epley => "Epley",
            FormulaMethod::Brzycki => "Brzycki",
            FormulaMethod::Lombardi => "Lombardi",
            FormulaMethod::McGlothin => "McGlothin",
        }
    }
}

impl fmt::Display for FormulaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a record was lifted or inferred from a submaximal set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Actual,
    Calculated,
}

/// How an estimated max entered the history
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaxSource {
    /// Derived from a completed set in a logged workout
    LoggedSet,
    /// A directly tested single or low-rep max
    Tested,
    /// Entered by hand
    Manual,
}

impl MaxSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaxSource::LoggedSet => "logged_set",
            MaxSource::Tested => "tested",
            MaxSource::Manual => "manual",
        }
    }
}

/// Reliability of an estimated max
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Confidence implied by the rep count an estimate was derived from
    pub fn from_reps(reps: u32) -> Self {
        match reps {
            0 | 1 => Confidence::High,
            2..=12 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Numeric weight used for plotting and weighting
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.6,
            Confidence::Low => 0.3,
        }
    }
}

// ============================================================================
// Profile Tags
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

// ============================================================================
// Entities
// ============================================================================

/// A catalog exercise (e.g., "Barbell Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub primary_muscle: MuscleGroup,
    #[serde(default)]
    pub secondary_muscles: Vec<MuscleGroup>,
    pub equipment: Option<Equipment>,
    pub exercise_type: ExerciseType,
    pub is_compound: bool,
    pub instructions: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, primary_muscle: MuscleGroup, exercise_type: ExerciseType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            primary_muscle,
            secondary_muscles: Vec::new(),
            equipment: None,
            exercise_type,
            is_compound: false,
            instructions: None,
        }
    }
}

/// A training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub duration_seconds: Option<u32>,
    pub notes: Option<String>,
}

impl Workout {
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            duration_seconds: None,
            notes: None,
        }
    }
}

/// One exercise slot within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub id: Uuid,
    /// Owning workout
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub order_index: u32,
    pub rest_seconds: u32,
    pub notes: Option<String>,
}

/// A single set, owned by a [`WorkoutExercise`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    pub id: Uuid,
    /// Owning workout exercise
    pub workout_exercise_id: Uuid,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub completed: bool,
    pub rpe: Option<u8>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
    pub duration_seconds: Option<u32>,
    pub distance: Option<f64>,
}

/// Best lift recorded for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalRecord {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub weight: f64,
    pub reps: u32,
    pub date: DateTime<Utc>,
    pub record_type: RecordType,
    pub method: FormulaMethod,
    pub workout_exercise_id: Option<Uuid>,
}

/// One point in an exercise's estimated-1RM time series
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OneRepMaxHistory {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub estimated_max: f64,
    pub date: DateTime<Utc>,
    pub source: MaxSource,
    pub method: FormulaMethod,
    pub confidence: Confidence,
    pub personal_record_id: Option<Uuid>,
}

/// The local owner's profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub weight_unit: WeightUnit,
    pub experience_level: ExperienceLevel,
    pub workout_days_per_week: u8,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

impl UserProfile {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            weight_unit: WeightUnit::default(),
            experience_level: ExperienceLevel::default(),
            workout_days_per_week: 3,
            goals: Vec::new(),
            equipment: Vec::new(),
        }
    }
}

/// Per-kind entity counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub exercises: usize,
    pub workouts: usize,
    pub workout_exercises: usize,
    pub sets: usize,
    pub personal_records: usize,
    pub history: usize,
    pub profiles: usize,
}

impl EntityCounts {
    pub fn total(&self) -> usize {
        self.exercises
            + self.workouts
            + self.workout_exercises
            + self.sets
            + self.personal_records
            + self.history
            + self.profiles
    }
}
