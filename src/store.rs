//! Persistence of normalized rows as flat documents.
//!
//! Every row of the prepared table (before any filtering) is written as one
//! document. Writes are independent: a failed row is reported and the rest
//! continue, nothing is rolled back.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::utils::arrow::cell_text;

/// Key under which a store records a document's identifier
pub const ID_FIELD: &str = "_id";

/// A flat key-value document, one per table row
pub type Document = Map<String, Value>;

/// Opaque identifier assigned by a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Write-only document sink
pub trait DocumentStore {
    /// Store one document and return its new identifier
    fn insert(&mut self, document: Document) -> Result<DocumentId>;
}

/// Store that keeps documents in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<(DocumentId, Document)>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored documents in insertion order
    #[must_use]
    pub fn documents(&self) -> &[(DocumentId, Document)] {
        &self.documents
    }

    /// Number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing has been stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&mut self, document: Document) -> Result<DocumentId> {
        let id = DocumentId::new_random();
        self.documents.push((id, document));
        Ok(id)
    }
}

/// Store that appends one JSON object per line to a file
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    writer: BufWriter<std::fs::File>,
}

impl JsonLinesStore {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ScheduleError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// The file documents are appended to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonLinesStore {
    fn insert(&mut self, mut document: Document) -> Result<DocumentId> {
        let id = DocumentId::new_random();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        serde_json::to_writer(&mut self.writer, &document)?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|e| ScheduleError::io(&self.path, e))?;
        Ok(id)
    }
}

/// Outcome of persisting a table
#[derive(Debug, Default)]
pub struct PersistReport {
    /// Identifiers of stored rows, in row order
    pub stored: Vec<DocumentId>,
    /// Row index and error text for each row that failed
    pub failures: Vec<(usize, String)>,
}

/// Render one row as a flat document; nulls stay null
#[must_use]
pub fn row_document(batch: &RecordBatch, row: usize) -> Document {
    batch
        .schema()
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, column)| {
            let value = cell_text(column, row).map_or(Value::Null, Value::String);
            (field.name().clone(), value)
        })
        .collect()
}

/// Write every row of `batch` to `store`, one document per row
pub fn persist_rows(batch: &RecordBatch, store: &mut dyn DocumentStore) -> PersistReport {
    let mut report = PersistReport::default();
    for row in 0..batch.num_rows() {
        match store.insert(row_document(batch, row)) {
            Ok(id) => report.stored.push(id),
            Err(e) => {
                log::warn!("Failed to persist row {row}: {e}");
                report.failures.push((row, e.to_string()));
            }
        }
    }
    log::info!(
        "Persisted {} rows ({} failures)",
        report.stored.len(),
        report.failures.len()
    );
    report
}
