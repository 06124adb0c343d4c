//! # abscore Core Library
//!
//! A deterministic scoring engine for computationally designed antibodies. It turns a set
//! of heterogeneous, possibly missing raw metric values into bounded per-metric scores,
//! category scores, and a single final score on a fixed 0-100 scale.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MetricRecord`, `MetricValue`),
//!   the declarative weight profiles that describe each challenge variant, the pure scoring
//!   math (`Normalizer`, `CategoryAggregator`, `FinalScorer`), and CSV I/O.
//!
//! - **[`engine`]: The Bookkeeping Layer.** Error taxonomy, progress reporting, and the
//!   append-only `ScoreTable` produced by the `BatchAggregator`.
//!
//! - **[`workflows`]: The Public API.** Ties a record and its challenge profile together
//!   and scores whole batches of designs.
//!
//! Missing metrics are a first-class state. They are never substituted with zero; the
//! weight of an absent metric is redistributed over the present ones instead.

pub mod core;
pub mod engine;
pub mod workflows;
