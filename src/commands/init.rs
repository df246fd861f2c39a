use anyhow::Result;
use tracing::{info, warn};

use crate::cli::InitArgs;
use crate::corpus::Corpus;
use crate::error::LabelError;
use crate::session::Session;
use crate::store::{AnnotationStore, InitChoice};
use crate::util::ensure_directory;

pub fn run(args: InitArgs) -> Result<()> {
    let session = Session::from_args(&args.session)?;
    let labels_path = session.labels_path();

    // Fail on a bad data directory before creating anything.
    Corpus::load(&session.data_dir)?;

    let choice = match (args.create, args.no_create) {
        (true, _) => InitChoice::Create,
        (false, true) => InitChoice::Decline,
        (false, false) => InitChoice::Undecided,
    };

    if args.create {
        ensure_directory(&session.out_dir)?;
    }

    match AnnotationStore::ensure_initialized(&labels_path, choice) {
        Ok(store) => {
            info!(
                path = %store.path().display(),
                annotator = %session.annotator,
                experiment = %session.experiment,
                rows = store.table().len(),
                "labels table ready"
            );
            Ok(())
        }
        Err(err @ LabelError::StoreNotReady { .. }) if choice == InitChoice::Decline => {
            warn!(
                path = %labels_path.display(),
                "labels table creation declined; cannot annotate without it"
            );
            Err(err.into())
        }
        Err(err @ LabelError::StoreNotReady { .. }) => {
            warn!(
                path = %labels_path.display(),
                "labels table not found; check the experiment name and rerun with --create"
            );
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
