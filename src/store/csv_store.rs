//! CSV-backed record store
//!
//! The dataset file has a fixed 8-column header. Rows are keyed by the last
//! column (the listing link). Rows with fewer than 8 fields are treated as
//! truncated and skipped on load.

use crate::store::traits::{RecordStore, StoreError, StoreResult};
use crate::store::{Record, RecordMap};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Header row written to every dataset file
pub const CSV_HEADER: [&str; 8] = [
    "Name",
    "Phone",
    "Website",
    "Rating",
    "Reviews",
    "Category",
    "Address",
    "System_Link_ID",
];

/// Resolves a user-supplied dataset name against the data directory
///
/// A `.csv` extension is appended when the name does not already carry one.
///
/// # Example
///
/// ```
/// use leadsweep::store::dataset_path;
/// use std::path::Path;
///
/// assert_eq!(dataset_path(Path::new("data"), "leads"), Path::new("data/leads.csv"));
/// assert_eq!(dataset_path(Path::new("."), "leads.csv"), Path::new("./leads.csv"));
/// ```
pub fn dataset_path(data_dir: &Path, file_name: &str) -> PathBuf {
    let file_name = file_name.trim();
    if file_name.ends_with(".csv") {
        data_dir.join(file_name)
    } else {
        data_dir.join(format!("{}.csv", file_name))
    }
}

/// Record store persisted as a single CSV file
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    /// Creates a store for the file at `path`
    ///
    /// Nothing is read or created until `load` or `persist` is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the dataset file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> StoreResult<RecordMap> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No dataset at {}, starting empty", self.path.display());
                return Ok(RecordMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut records = RecordMap::new();
        let mut skipped = 0usize;

        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping unreadable row {}: {}", index + 2, e);
                    skipped += 1;
                    continue;
                }
            };

            if row.len() < CSV_HEADER.len() {
                skipped += 1;
                continue;
            }

            let record = Record {
                name: row[0].to_string(),
                phone: row[1].to_string(),
                website: row[2].to_string(),
                rating_value: row[3].to_string(),
                review_count: row[4].to_string(),
                category: row[5].to_string(),
                address: row[6].to_string(),
                source_link: row[7].to_string(),
            };
            records.insert(record.source_link.clone(), record);
        }

        if skipped > 0 {
            tracing::warn!(
                "Skipped {} malformed row(s) in {}",
                skipped,
                self.path.display()
            );
        }

        tracing::debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );

        Ok(records)
    }

    fn persist(&self, records: &RecordMap) -> StoreResult<()> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)?;

        // Sibling temp file so the final rename stays on one filesystem
        let mut tmp = temp_builder().tempfile_in(&dir)?;
        if let Ok(existing) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(CSV_HEADER)?;

            let mut rows: Vec<&Record> = records.values().collect();
            rows.sort_by(|a, b| a.source_link.cmp(&b.source_link));

            for record in rows {
                writer.write_record([
                    record.name.as_str(),
                    record.phone.as_str(),
                    record.website.as_str(),
                    record.rating_value.as_str(),
                    record.review_count.as_str(),
                    record.category.as_str(),
                    record.address.as_str(),
                    record.source_link.as_str(),
                ])?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| StoreError::Replace {
            path: self.path.display().to_string(),
            source: e.error,
        })?;

        tracing::info!(
            "Persisted {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Temp file builder whose files start out with a plain create's mode
fn temp_builder() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(link: &str) -> Record {
        Record {
            name: "Smith, Jones & Partners".to_string(),
            phone: "(212) 555-0100".to_string(),
            website: "https://smithjones.example".to_string(),
            rating_value: "4.8".to_string(),
            review_count: "1,204".to_string(),
            category: "Lawyer".to_string(),
            address: "1 Main St, New York, NY 10001".to_string(),
            source_link: link.to_string(),
        }
    }

    #[test]
    fn test_dataset_path_appends_extension() {
        assert_eq!(
            dataset_path(Path::new("/data"), "leads"),
            PathBuf::from("/data/leads.csv")
        );
        assert_eq!(
            dataset_path(Path::new("/data"), " leads.csv "),
            PathBuf::from("/data/leads.csv")
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvRecordStore::new(dir.path().join("missing.csv"));

        let records = store.load().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CsvRecordStore::new(dir.path().join("leads.csv"));

        let mut records = RecordMap::new();
        for link in ["https://maps.example/place/b", "https://maps.example/place/a"] {
            records.insert(link.to_string(), record(link));
        }

        store.persist(&records).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn test_persist_writes_header_and_sorted_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.csv");
        let store = CsvRecordStore::new(&path);

        let mut records = RecordMap::new();
        records.insert("z".to_string(), record("z"));
        records.insert("a".to_string(), record("a"));
        store.persist(&records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,Phone,Website,Rating,Reviews,Category,Address,System_Link_ID"
        );
        assert!(lines.next().unwrap().ends_with(",a"));
        assert!(lines.next().unwrap().ends_with(",z"));
    }

    #[test]
    fn test_load_skips_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.csv");
        std::fs::write(
            &path,
            "Name,Phone,Website,Rating,Reviews,Category,Address,System_Link_ID\n\
             Good,1,w,4.0,3,Cafe,Addr,link-1\n\
             Truncated,1,w\n\
             Also Good,2,w,3.5,9,Bar,Addr,link-2\n",
        )
        .unwrap();

        let records = CsvRecordStore::new(&path).load().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records["link-1"].name, "Good");
        assert_eq!(records["link-2"].review_count, "9");
    }

    #[test]
    fn test_persist_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = CsvRecordStore::new(dir.path().join("leads.csv"));

        let mut first = RecordMap::new();
        first.insert("a".to_string(), record("a"));
        first.insert("b".to_string(), record("b"));
        store.persist(&first).unwrap();

        let mut second = RecordMap::new();
        second.insert("c".to_string(), record("c"));
        store.persist(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("c"));
    }

    #[test]
    fn test_persist_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = CsvRecordStore::new(dir.path().join("nested/out/leads.csv"));

        store.persist(&RecordMap::new()).unwrap();
        assert!(store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_creates_file_with_umask_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let reference = dir.path().join("reference.csv");
        File::create(&reference).unwrap();
        let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        let path = dir.path().join("leads.csv");
        CsvRecordStore::new(&path).persist(&RecordMap::new()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.csv");
        let store = CsvRecordStore::new(&path);
        store.persist(&RecordMap::new()).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let mut records = RecordMap::new();
        records.insert("a".to_string(), record("a"));
        store.persist(&records).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
