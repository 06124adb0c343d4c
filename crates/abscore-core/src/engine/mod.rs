//! # Engine Module
//!
//! The stateful layer of the scoring engine: the error taxonomy shared by batch runs,
//! progress events for whoever drives a run, and the append-only batch table that turns
//! scored records into an ordered, duplicate-free [`ScoreTable`](table::ScoreTable).
//!
//! - **Error Handling** ([`error`]) - configuration and duplicate-design failures
//! - **Progress Monitoring** ([`progress`]) - phase and task events with an optional callback
//! - **Batch Table** ([`table`]) - single-writer aggregation, ranked views, and report rows

pub mod error;
pub mod progress;
pub mod table;
