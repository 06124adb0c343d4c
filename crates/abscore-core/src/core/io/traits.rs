use crate::core::models::record::MetricRecord;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A tabular layout that raw metrics can be read from.
///
/// Implementors turn one input stream into producer-owned [`MetricRecord`]s in
/// first-seen order. Duplicate designs are passed through; rejecting them is the
/// batch table's job.
pub trait MetricSource {
    type Error: Error + From<io::Error>;

    fn read_from(&self, reader: impl Read) -> Result<Vec<MetricRecord>, Self::Error>;

    fn read_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<MetricRecord>, Self::Error> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }
}
