// # File Record Store
//
// File-based implementation of RecordStore.
//
// ## File Format
//
// An indented JSON array of records. Absent identifiers, TTLs and field
// types are omitted rather than zero-filled:
//
// ```json
// [
//   {
//     "zone": "example.com",
//     "subDomain": "www",
//     "target": "1.2.3.4",
//     "id": 5138273
//   }
// ]
// ```
//
// ## Writes
//
// Every save rewrites the whole file: the new content goes to a
// temporary sibling file that is then renamed over the original.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::record::Record;
use crate::traits::RecordStore;

/// File-based record store
///
/// # Example
///
/// ```rust,no_run
/// use ons_core::store::FileRecordStore;
/// use ons_core::traits::RecordStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRecordStore::open_or_create("dns/ons.state.json").await?;
///     let records = store.load().await?;
///     store.save(&records).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    /// Open an existing store file
    ///
    /// Fails with a persistence error if the file does not exist.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::persistence(format!(
                "Record file {} does not exist",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Open a store file, creating it as an empty array if missing
    ///
    /// Parent directories are created as needed.
    pub async fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };

        if fs::try_exists(&store.path).await.unwrap_or(false) {
            return Ok(store);
        }

        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::persistence(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tracing::debug!("Creating empty record file {}", store.path.display());
        store.save(&[]).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `content` to a temp file then rename it over the store file
    async fn write_atomic(&self, content: &str) -> Result<(), Error> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(content.as_bytes()).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn load(&self) -> Result<Vec<Record>, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to read record file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let records: Vec<Record> = serde_json::from_str(&content).map_err(|e| {
            Error::persistence(format!(
                "Failed to parse record file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Loaded {} record(s) from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    async fn save(&self, records: &[Record]) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::persistence(format!("Failed to serialize records: {}", e)))?;

        self.write_atomic(&json).await?;

        tracing::trace!(
            "Wrote {} record(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
