//! Report domain module.
//!
//! # Module Structure
//!
//! - `model`: `Report`, `ReportDraft`, `ReportPatch` and input helpers
//! - `store`: the reducer and the write-through `ReportStore`
//! - `seed`: demo records used when nothing usable is persisted
//!
//! # Usage
//!
//! ```ignore
//! use statusboard_core::report::{ReportStore, ReportDraft, ReportPatch};
//! ```

mod model;
mod seed;
pub mod store;

// Re-export public API
pub use model::{
    DEFAULT_TEAM, DEFAULT_TITLE, Report, ReportDraft, ReportPatch, lines_from_text,
};
pub use seed::demo_reports;
pub use store::{ReportAction, ReportState, ReportStore, reduce};
