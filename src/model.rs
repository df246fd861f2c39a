use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column layout of the per-annotator labels table, in file order.
pub const LABEL_COLUMNS: [&str; 8] = [
    "doc_id",
    "q_id",
    "supposed_to_be_confusing",
    "llm_confuse_label",
    "llm_defuse_label",
    "human_confuse_label",
    "human_defuse_label",
    "question_category",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    pub document: String,
}

/// One generated question with the model's response and confusion judgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrcRecord {
    pub doc_id: String,
    pub q_id: String,
    pub is_confusing: String,
    pub question: String,
    pub response: String,
    pub confusion: String,
    pub is_defused: String,
}

impl QrcRecord {
    /// The model's confusion verdict is the first line of its free-form judgment.
    pub fn llm_confuse_label(&self) -> &str {
        self.confusion.lines().next().unwrap_or_default().trim()
    }

    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(&self.doc_id, &self.q_id, &self.is_confusing)
    }

    /// Non-confusing questions are always shown; designed-confusing ones only
    /// when the whole model judgment is exactly "yes". A judgment with a
    /// trailing explanation does not qualify.
    pub fn is_selectable(&self) -> bool {
        match normalize_flag(&self.is_confusing).as_str() {
            "no" => true,
            "yes" => self.confusion == "yes",
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AnnotationKey {
    pub doc_id: String,
    pub q_id: String,
    pub supposed_to_be_confusing: String,
}

impl AnnotationKey {
    pub fn new(doc_id: &str, q_id: &str, supposed_to_be_confusing: &str) -> Self {
        Self {
            doc_id: normalize_key_component(doc_id),
            q_id: normalize_key_component(q_id),
            supposed_to_be_confusing: normalize_flag(supposed_to_be_confusing),
        }
    }
}

/// Designed-confusing flags compare case-insensitively ("Yes" == "yes").
pub fn normalize_flag(value: &str) -> String {
    normalize_key_component(value).to_ascii_lowercase()
}

/// Keys are compared as strings. Integral floats ("3.0") collapse to their
/// integer form so ids written by dataframe tools still match.
pub fn normalize_key_component(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(integral) = trimmed.strip_suffix(".0") {
        if !integral.is_empty()
            && integral
                .strip_prefix('-')
                .unwrap_or(integral)
                .chars()
                .all(|ch| ch.is_ascii_digit())
        {
            return integral.to_string();
        }
    }
    trimmed.to_string()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HumanLabel {
    #[serde(alias = "didnt_select")]
    #[value(alias = "didnt-select")]
    DidNotSelect,
    #[serde(alias = "True", alias = "true", alias = "Yes")]
    #[value(alias = "true")]
    Yes,
    #[serde(alias = "False", alias = "false", alias = "No")]
    #[value(alias = "false")]
    No,
}

impl HumanLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DidNotSelect => "did_not_select",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

/// A row of the labels table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub doc_id: String,
    pub q_id: String,
    pub supposed_to_be_confusing: String,
    pub llm_confuse_label: String,
    pub llm_defuse_label: String,
    pub human_confuse_label: HumanLabel,
    pub human_defuse_label: HumanLabel,
    pub question_category: String,
}

impl AnnotationRecord {
    pub fn from_qrc(
        qrc: &QrcRecord,
        human_confuse_label: HumanLabel,
        human_defuse_label: HumanLabel,
        question_category: String,
    ) -> Self {
        let key = qrc.key();
        Self {
            doc_id: key.doc_id,
            q_id: key.q_id,
            supposed_to_be_confusing: key.supposed_to_be_confusing,
            llm_confuse_label: qrc.llm_confuse_label().to_string(),
            llm_defuse_label: qrc.is_defused.trim().to_string(),
            human_confuse_label,
            human_defuse_label,
            question_category,
        }
    }

    pub fn key(&self) -> AnnotationKey {
        AnnotationKey::new(&self.doc_id, &self.q_id, &self.supposed_to_be_confusing)
    }

    /// Rewrites the key columns in their normalized form.
    pub fn normalize_key(&mut self) {
        let key = self.key();
        self.doc_id = key.doc_id;
        self.q_id = key.q_id;
        self.supposed_to_be_confusing = key.supposed_to_be_confusing;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentProgress {
    pub doc_id: String,
    pub expected: usize,
    pub done: usize,
    pub remaining: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub report_version: u32,
    pub generated_at: String,
    pub annotator: String,
    pub experiment: String,
    pub labels_path: String,
    pub annotated_rows: usize,
    pub document_count: usize,
    pub complete_document_count: usize,
    pub documents: Vec<DocumentProgress>,
}
