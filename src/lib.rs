//! Scenario & template content manager.
//!
//! Normalizes and merges heterogeneous scenario/template records (JSON or
//! CSV sources) into two canonical JSON documents consumed by a downstream
//! content-review app. The pipeline modules (`text` → `coerce` →
//! `list_literal` → `categorize` → `notes` → `scenario` → `merge`) are pure
//! in-memory transforms; only `store` and `import` touch the filesystem.

pub mod categorize;
pub mod coerce;
pub mod csv_import;
pub mod error;
pub mod import;
pub mod list_literal;
pub mod merge;
pub mod notes;
pub mod scenario;
pub mod store;
pub mod text;
