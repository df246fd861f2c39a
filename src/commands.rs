use anyhow::{Context, Result};

use crate::cli::SessionArgs;
use crate::corpus::Corpus;
use crate::session::Session;
use crate::store::{AnnotationStore, InitChoice};

pub mod docs;
pub mod init;
pub mod show;
pub mod status;
pub mod submit;

/// Everything a labeling command needs, loaded once per invocation.
pub struct Workspace {
    pub session: Session,
    pub corpus: Corpus,
    pub store: AnnotationStore,
}

/// Loads the corpus and opens the labels table. A missing table blocks every
/// command except `init --create`.
pub fn open_workspace(args: &SessionArgs) -> Result<Workspace> {
    let session = Session::from_args(args)?;
    let corpus = Corpus::load(&session.data_dir)
        .with_context(|| format!("failed to load corpus from {}", session.data_dir.display()))?;
    let store = AnnotationStore::ensure_initialized(&session.labels_path(), InitChoice::Undecided)?;

    Ok(Workspace {
        session,
        corpus,
        store,
    })
}

#[cfg(test)]
mod tests;
