//! Tabular input and output at the engine boundary.
//!
//! Raw metrics arrive as CSV in either a long layout (one row per metric value) or a
//! wide layout (one row per design, one column per metric). Scored batches leave as a
//! flat CSV report with explicit empty cells for absent values.

pub(crate) mod aliases;
pub mod metrics_csv;
pub mod report_csv;
pub mod traits;

pub use metrics_csv::{LongCsv, MetricsCsvError, WideCsv, read_long, read_wide};
pub use report_csv::{ReportError, write_table};
pub use traits::MetricSource;
