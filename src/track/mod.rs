//! Term tracking: epoch counters, history, and table rendering.
//!
//! ## Submodules
//!
//! - [`terms`]: The validated tracked-term set and the subscribe filter
//! - [`tracker`]: [`TermTracker`] epoch bookkeeping and row rendering
//! - [`table`]: Fixed-width column layout shared by all report lines
//!
//! ## Data flow
//!
//! ```text
//! feed events (text / limit)
//!        │
//!        ▼
//! TermTracker::process_text() / record_missed()
//!        │
//!        ├──▶ render_count_line() (live epoch row)
//!        │
//!        └──▶ end_epoch() ──▶ history of EpochRecord
//! ```

pub mod table;
pub mod terms;
pub mod tracker;

pub use table::TableLayout;
pub use terms::{FilterSpec, TrackedTerms};
pub use tracker::{EpochRecord, TermTracker, TrackerError};
