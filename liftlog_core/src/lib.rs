#![forbid(unsafe_code)]

//! Core domain model and business logic for liftlog.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, sets, records, 1RM history)
//! - The entity store with ownership and cascade rules
//! - 1RM formulas and progress tracking
//! - Graph export/import and safe full wipe
//! - Catalog seeding and generated-workout validation
//! - Persistence and configuration

pub mod types;
pub mod error;
pub mod store;
pub mod formula;
pub mod tracking;
pub mod cleanup;
pub mod codec;
pub mod catalog;
pub mod generated;
pub mod persist;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use store::{EntityStore, IntegrityViolation};
pub use config::Config;
pub use persist::{NullSink, StoreFile, StoreSink};
pub use cleanup::{wipe_all, WipeReport};
pub use tracking::{current_best, history_for, progression, record_set, TimeWindow};
pub use codec::{export, import_bytes, import_file, ExportDocument, ImportReport};
pub use generated::{validate_generated, GeneratedWorkout};
