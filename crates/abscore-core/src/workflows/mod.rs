//! # Workflows Module
//!
//! The public entry points of the library. [`score::score_record`] turns one raw
//! [`MetricRecord`](crate::core::models::record::MetricRecord) into a frozen
//! [`ScoredRecord`](crate::core::models::record::ScoredRecord) under a weight profile, and
//! [`score::run`] does the same for a whole batch, resolving profiles up front, scoring
//! designs in parallel, and collecting them into a duplicate-free score table.

pub mod score;
