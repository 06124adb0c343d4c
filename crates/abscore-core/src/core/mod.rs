//! # Core Module
//!
//! Fundamental building blocks of the scoring engine.
//!
//! - **Data Model** ([`models`]) - Identifiers, raw metric values, and per-design records
//! - **Configuration** ([`profile`]) - Metric/category definitions and per-challenge weight profiles
//! - **Scoring Math** ([`scoring`]) - Normalization, missing-data renormalization, and viability gates
//! - **Tabular I/O** ([`io`]) - Raw metric ingestion and report serialization as CSV
//!
//! Everything in this module is pure: no global state, no tool invocation, and identical
//! inputs always produce identical outputs.

pub mod io;
pub mod models;
pub mod profile;
pub mod scoring;
