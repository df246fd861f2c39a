use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{LabelError, LabelResult};
use crate::model::{AnnotationKey, AnnotationRecord, LABEL_COLUMNS, normalize_key_component};
use crate::util::write_atomically;

/// Whether the annotator agreed to create a missing labels table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InitChoice {
    Create,
    Decline,
    Undecided,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpsertOutcome {
    Created,
    Overwritten,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completeness {
    pub done: BTreeSet<AnnotationKey>,
    pub remaining: BTreeSet<AnnotationKey>,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn expected_len(&self) -> usize {
        self.done.len() + self.remaining.len()
    }
}

/// Labels rows in storage order with a key index. At most one row per key.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    rows: Vec<AnnotationRecord>,
    index: HashMap<AnnotationKey, usize>,
}

impl AnnotationTable {
    /// Builds a table from raw rows. A repeated key keeps the position of its
    /// first row and the values of its last.
    pub fn from_rows(rows: Vec<AnnotationRecord>) -> Self {
        let mut table = Self::default();
        for row in rows {
            let key = row.key();
            if table.index.contains_key(&key) {
                warn!(
                    doc_id = %key.doc_id,
                    q_id = %key.q_id,
                    supposed_to_be_confusing = %key.supposed_to_be_confusing,
                    "collapsed duplicate labels row"
                );
            }
            table.upsert(row);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[AnnotationRecord] {
        &self.rows
    }

    pub fn get(&self, key: &AnnotationKey) -> Option<&AnnotationRecord> {
        self.index.get(key).map(|&position| &self.rows[position])
    }

    pub fn upsert(&mut self, mut record: AnnotationRecord) -> UpsertOutcome {
        record.normalize_key();
        let key = record.key();

        match self.index.get(&key) {
            Some(&position) => {
                self.rows[position] = record;
                UpsertOutcome::Overwritten
            }
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(record);
                UpsertOutcome::Created
            }
        }
    }

    /// Splits `expected` into keys already annotated and keys still open.
    /// Annotated keys outside `expected` do not count.
    pub fn completeness(&self, doc_id: &str, expected: &BTreeSet<AnnotationKey>) -> Completeness {
        let doc_id = normalize_key_component(doc_id);
        let (done, remaining): (BTreeSet<_>, BTreeSet<_>) = expected
            .iter()
            .filter(|key| key.doc_id == doc_id)
            .cloned()
            .partition(|key| self.index.contains_key(key));

        Completeness { done, remaining }
    }
}

/// File-backed labels table for one (annotator, experiment) pair.
#[derive(Debug)]
pub struct AnnotationStore {
    path: PathBuf,
    table: AnnotationTable,
}

impl AnnotationStore {
    pub fn ensure_initialized(path: &Path, choice: InitChoice) -> LabelResult<Self> {
        if path.exists() {
            return Self::open(path);
        }

        match choice {
            InitChoice::Create => {
                let table = AnnotationTable::default();
                write_table(path, &table)?;
                info!(path = %path.display(), "created labels table");
                Ok(Self {
                    path: path.to_path_buf(),
                    table,
                })
            }
            InitChoice::Decline | InitChoice::Undecided => Err(LabelError::StoreNotReady {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn open(path: &Path) -> LabelResult<Self> {
        let table = load_table(path)?;
        debug!(path = %path.display(), rows = table.len(), "opened labels table");
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &AnnotationTable {
        &self.table
    }

    /// Read-modify-write against the file on disk. The in-memory view only
    /// changes once the rewritten table has been persisted.
    pub fn upsert(&mut self, record: AnnotationRecord) -> LabelResult<UpsertOutcome> {
        let mut table = load_table(&self.path)?;
        let outcome = table.upsert(record);
        write_table(&self.path, &table)?;
        self.table = table;
        Ok(outcome)
    }

    pub fn completeness(&self, doc_id: &str, expected: &BTreeSet<AnnotationKey>) -> Completeness {
        self.table.completeness(doc_id, expected)
    }
}

fn load_table(path: &Path) -> LabelResult<AnnotationTable> {
    if !path.exists() {
        return Err(LabelError::StoreNotReady {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| LabelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader.headers().map_err(|source| LabelError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let missing: Vec<String> = LABEL_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LabelError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<AnnotationRecord>().enumerate() {
        let row = row.map_err(|err| LabelError::MalformedTable {
            path: path.to_path_buf(),
            reason: format!("record {}: {err}", index + 1),
        })?;
        rows.push(row);
    }

    Ok(AnnotationTable::from_rows(rows))
}

fn write_table(path: &Path, table: &AnnotationTable) -> LabelResult<()> {
    let csv_err = |source| LabelError::Csv {
        path: path.to_path_buf(),
        source,
    };

    write_atomically(path, |file| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(LABEL_COLUMNS).map_err(csv_err)?;
        for row in table.rows() {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })
    })
}
