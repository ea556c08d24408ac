use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::CustomerRecord;

/// Backing storage for customer records.
pub trait CustomerSource: Send + Sync {
    /// Human readable location, used in warnings.
    fn describe(&self) -> String;
    fn read(&self) -> Result<Vec<CustomerRecord>, SourceError>;
    fn write(&self, records: &[CustomerRecord]) -> Result<(), SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("customer data not found at {0}")]
    Missing(String),
    #[error("failed to access customer data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed customer data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("customer data source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CustomerFile {
    #[serde(default)]
    customers: Vec<CustomerRecord>,
}

/// JSON file shaped `{"customers": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CustomerSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Vec<CustomerRecord>, SourceError> {
        let raw = fs::read_to_string(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => SourceError::Missing(self.describe()),
            _ => SourceError::Io(err),
        })?;
        let file: CustomerFile = serde_json::from_str(&raw)?;
        Ok(file.customers)
    }

    fn write(&self, records: &[CustomerRecord]) -> Result<(), SourceError> {
        let file = CustomerFile {
            customers: records.to_vec(),
        };
        let mut body = serde_json::to_string_pretty(&file)?;
        body.push('\n');
        fs::write(&self.path, body)?;
        Ok(())
    }
}

/// In-memory source for demos and tests. Counts writes so callers can assert
/// whether a persist happened.
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Mutex<Vec<CustomerRecord>>,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl MemorySource {
    pub fn new(records: Vec<CustomerRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            writes: AtomicUsize::new(0),
            fail_writes: false,
        }
    }

    /// A source whose writes always fail, for exercising persist errors.
    pub fn read_only(records: Vec<CustomerRecord>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(records)
        }
    }

    pub fn snapshot(&self) -> Result<Vec<CustomerRecord>, SourceError> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| SourceError::Unavailable("memory source poisoned".to_string()))
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl CustomerSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read(&self) -> Result<Vec<CustomerRecord>, SourceError> {
        self.snapshot()
    }

    fn write(&self, records: &[CustomerRecord]) -> Result<(), SourceError> {
        if self.fail_writes {
            return Err(SourceError::Unavailable("memory source is read-only".to_string()));
        }
        let mut guard = self
            .records
            .lock()
            .map_err(|_| SourceError::Unavailable("memory source poisoned".to_string()))?;
        *guard = records.to_vec();
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_source_preserves_unknown_fields_on_write_back() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"customers": [{{"customer_id": "CUST_900", "name": "Kit", "loyalty_points": 12}}]}}"#
        )
        .expect("seed file");

        let source = JsonFileSource::new(file.path());
        let records = source.read().expect("read records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extra["loyalty_points"], serde_json::json!(12));

        source.write(&records).expect("write back");
        let reread = source.read().expect("read again");
        assert_eq!(reread, records);
    }

    #[test]
    fn missing_file_reports_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(source.read(), Err(SourceError::Missing(_))));
    }

    #[test]
    fn read_only_memory_source_rejects_writes() {
        let source = MemorySource::read_only(vec![CustomerRecord::new("CUST_1", "One")]);
        assert!(source.write(&[]).is_err());
        assert_eq!(source.write_count(), 0);
        assert_eq!(source.snapshot().expect("snapshot").len(), 1);
    }
}
