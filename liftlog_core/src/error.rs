//! Error types for the liftlog_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Persisted store could not be read back
    #[error("Store error: {0}")]
    Store(String),

    /// Export requested on a store with nothing in it
    #[error("Nothing to export: every entity collection is empty")]
    EmptyStore,

    /// Import input is not a structured JSON document
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Import input parsed but lacks the export format marker
    #[error("Not a recognized export: missing '{0}' field")]
    NotARecognizedExport(&'static str),

    /// Candidate workout failed structural validation
    #[error("Invalid workout: {0}")]
    InvalidWorkout(String),

    /// Exercise still referenced by workouts, records or history
    #[error("Exercise {id} is still referenced by {references} entities")]
    ExerciseInUse { id: Uuid, references: usize },

    #[error("Unknown exercise: {0}")]
    UnknownExercise(Uuid),

    #[error("Unknown workout: {0}")]
    UnknownWorkout(Uuid),

    #[error("Unknown workout exercise: {0}")]
    UnknownWorkoutExercise(Uuid),

    #[error("Unknown set: {0}")]
    UnknownSet(Uuid),

    #[error("Unknown personal record: {0}")]
    UnknownPersonalRecord(Uuid),

    /// Formula evaluated outside its valid rep range
    #[error("{method} is undefined for {reps} reps")]
    FormulaDomain { method: &'static str, reps: u32 },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
