pub mod ids;
pub mod metric;
pub mod record;
