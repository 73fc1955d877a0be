//! Graph export and import.
//!
//! The whole entity store is flattened into one self-describing JSON document
//! (see [`document`]) and rebuilt from it with ids preserved, so references
//! and prior history stay meaningful across a restore.

pub mod document;
pub mod export;
pub mod import;

pub use document::{ExportDocument, FORMAT_MARKER};
pub use export::{export, export_to_file, export_to_vec};
pub use import::{
    import_bytes, import_file, parse_document, ImportReport, ImportStage, ParsedDocument,
    SkipCounts,
};
