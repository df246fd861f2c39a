use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::SessionArgs;
use crate::error::{LabelError, LabelResult};

const IDENTITY_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";

/// Who is annotating what, threaded explicitly through every command.
#[derive(Debug, Clone)]
pub struct Session {
    pub annotator: String,
    pub experiment: String,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Session {
    pub fn from_args(args: &SessionArgs) -> Result<Self> {
        let experiment = match &args.experiment {
            Some(experiment) => experiment.clone(),
            None => default_experiment(&args.data_dir)?,
        };

        Self::new(&args.annotator, &experiment, &args.data_dir, &args.out_dir)
    }

    pub fn new(
        annotator: &str,
        experiment: &str,
        data_dir: &Path,
        out_dir: &Path,
    ) -> Result<Self> {
        let pattern = Regex::new(IDENTITY_PATTERN).context("failed to compile identity regex")?;
        let annotator = validate_identity(&pattern, "annotator", annotator)?;
        let experiment = validate_identity(&pattern, "experiment", experiment)?;

        Ok(Self {
            annotator,
            experiment,
            data_dir: data_dir.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn labels_file_name(&self) -> String {
        format!("{}_{}_labels.csv", self.annotator, self.experiment)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.out_dir.join(self.labels_file_name())
    }
}

fn validate_identity(pattern: &Regex, field: &'static str, value: &str) -> LabelResult<String> {
    let value = value.trim();
    if pattern.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(LabelError::InvalidIdentity {
            field,
            value: value.to_string(),
        })
    }
}

fn default_experiment(data_dir: &Path) -> LabelResult<String> {
    data_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .ok_or_else(|| LabelError::InvalidIdentity {
            field: "experiment",
            value: data_dir.display().to_string(),
        })
}
