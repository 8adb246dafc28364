//! Output of a run.
//!
//! - [`json`]: writes the job snapshot file consumed by the static page
//! - [`console`]: preview, per-source summary and the copy-paste JSON block
//!
//! ```text
//! real_jobs.json     # JSON array of Job objects, replaced on every run
//! ```

pub mod console;
pub mod json;
