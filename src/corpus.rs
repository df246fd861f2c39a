use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{LabelError, LabelResult};
use crate::model::{
    AnnotationKey, DocumentRecord, QrcRecord, normalize_flag, normalize_key_component,
};
use crate::ordering::{DISPLAY_SEED, shuffled};

pub const DOCS_FILE: &str = "docs_out.csv";
pub const QRC_FILE: &str = "qrc_out.csv";
pub const QRC_FILTER_FILE: &str = "qrc_filter.csv";

/// Documents and generated questions for one experiment topic, read once
/// per invocation.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<DocumentRecord>,
    questions: Vec<QrcRecord>,
    filter_rows: Vec<QrcRecord>,
}

impl Corpus {
    pub fn load(data_dir: &Path) -> LabelResult<Self> {
        let docs_path = data_dir.join(DOCS_FILE);
        let qrc_path = data_dir.join(QRC_FILE);
        let filter_path = data_dir.join(QRC_FILTER_FILE);

        let raw_documents: Vec<DocumentRecord> = read_required(&docs_path)?;
        let documents = dedupe_documents(raw_documents);

        let mut questions: Vec<QrcRecord> = read_required(&qrc_path)?;
        for question in &mut questions {
            question.doc_id = normalize_key_component(&question.doc_id);
            question.q_id = normalize_key_component(&question.q_id);
            question.is_confusing = normalize_flag(&question.is_confusing);
        }

        // The filter table is loaded for reporting only; it never changes which
        // questions are shown or counted toward completeness.
        let filter_rows = match read_optional_filter(&filter_path) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                debug!(path = %filter_path.display(), "no question filter present");
                Vec::new()
            }
            Err(err @ LabelError::EmptyOptionalData { .. }) => {
                warn!(error = %err, "question filter is empty");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        info!(
            data_dir = %data_dir.display(),
            documents = documents.len(),
            questions = questions.len(),
            filter_rows = filter_rows.len(),
            "loaded corpus"
        );

        Ok(Self {
            documents,
            questions,
            filter_rows,
        })
    }

    pub fn filter_rows(&self) -> &[QrcRecord] {
        &self.filter_rows
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn document(&self, doc_id: &str) -> LabelResult<&DocumentRecord> {
        let doc_id = normalize_key_component(doc_id);
        self.documents
            .iter()
            .find(|doc| doc.doc_id == doc_id)
            .ok_or(LabelError::UnknownDocument { doc_id })
    }

    /// Questions an annotator is asked to judge for `doc_id`, in file order.
    pub fn selected_questions(&self, doc_id: &str) -> Vec<&QrcRecord> {
        let doc_id = normalize_key_component(doc_id);
        self.questions
            .iter()
            .filter(|qrc| qrc.doc_id == doc_id && qrc.is_selectable())
            .collect()
    }

    /// Selected questions in their fixed-seed presentation order.
    pub fn display_questions(&self, doc_id: &str) -> Vec<&QrcRecord> {
        shuffled(self.selected_questions(doc_id), DISPLAY_SEED)
    }

    pub fn expected_keys(&self, doc_id: &str) -> BTreeSet<AnnotationKey> {
        self.selected_questions(doc_id)
            .into_iter()
            .map(QrcRecord::key)
            .collect()
    }

    /// Resolves a submission target by q_id, using the designed flag to
    /// disambiguate when the same q_id was generated both ways.
    pub fn find_question(
        &self,
        doc_id: &str,
        q_id: &str,
        is_confusing: Option<&str>,
    ) -> LabelResult<&QrcRecord> {
        let q_id = normalize_key_component(q_id);
        let flag = is_confusing.map(normalize_flag);

        let candidates: Vec<&QrcRecord> = self
            .selected_questions(doc_id)
            .into_iter()
            .filter(|qrc| qrc.q_id == q_id)
            .filter(|qrc| {
                flag.as_deref()
                    .is_none_or(|flag| qrc.is_confusing == flag)
            })
            .collect();

        match candidates.as_slice() {
            [only] => Ok(*only),
            [] => Err(LabelError::UnknownQuestion {
                doc_id: normalize_key_component(doc_id),
                q_id,
            }),
            _ => Err(LabelError::AmbiguousQuestion {
                doc_id: normalize_key_component(doc_id),
                q_id,
            }),
        }
    }

    /// Resolves a submission target by its 1-based position in display order.
    pub fn question_at(&self, doc_id: &str, position: usize) -> LabelResult<&QrcRecord> {
        position
            .checked_sub(1)
            .and_then(|index| self.display_questions(doc_id).get(index).copied())
            .ok_or_else(|| LabelError::UnknownQuestion {
                doc_id: normalize_key_component(doc_id),
                q_id: format!("#{position}"),
            })
    }
}

fn dedupe_documents(raw: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(raw.len());

    for mut doc in raw {
        doc.doc_id = normalize_key_component(&doc.doc_id);
        if seen.insert(doc.doc_id.clone()) {
            documents.push(doc);
        } else {
            warn!(doc_id = %doc.doc_id, "duplicate doc_id in document table; keeping first");
        }
    }

    documents
}

fn read_required<T: DeserializeOwned>(path: &Path) -> LabelResult<Vec<T>> {
    if !path.exists() {
        return Err(LabelError::MissingData {
            path: path.to_path_buf(),
        });
    }
    read_table(path)
}

fn read_optional_filter(path: &Path) -> LabelResult<Option<Vec<QrcRecord>>> {
    if !path.exists() {
        return Ok(None);
    }

    let rows: Vec<QrcRecord> = read_table(path).map_err(|err| LabelError::EmptyOptionalData {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    if rows.is_empty() {
        return Err(LabelError::EmptyOptionalData {
            path: path.to_path_buf(),
            reason: "no rows".to_string(),
        });
    }

    Ok(Some(rows))
}

fn read_table<T: DeserializeOwned>(path: &Path) -> LabelResult<Vec<T>> {
    let file = File::open(path).map_err(|source| LabelError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<T>().enumerate() {
        let row = row.map_err(|err| {
            if err.is_io_error() {
                LabelError::Csv {
                    path: path.to_path_buf(),
                    source: err,
                }
            } else {
                LabelError::MalformedTable {
                    path: path.to_path_buf(),
                    reason: format!("record {}: {err}", index + 1),
                }
            }
        })?;
        rows.push(row);
    }

    Ok(rows)
}
