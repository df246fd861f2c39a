use anyhow::Result;
use tracing::info;

use crate::cli::StatusArgs;
use crate::commands::{Workspace, open_workspace};
use crate::corpus::Corpus;
use crate::model::{DocumentProgress, ProgressReport};
use crate::store::AnnotationStore;
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: StatusArgs) -> Result<()> {
    let workspace = open_workspace(&args.session)?;
    let report = build_report(&workspace);

    info!(
        annotator = %report.annotator,
        experiment = %report.experiment,
        labels_path = %report.labels_path,
        annotated_rows = report.annotated_rows,
        documents = report.document_count,
        complete_documents = report.complete_document_count,
        filter_rows = workspace.corpus.filter_rows().len(),
        "labeling status"
    );

    if workspace.store.table().is_empty() {
        info!("no annotations recorded yet");
    }

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote progress report");
    }

    Ok(())
}

pub fn document_progress(corpus: &Corpus, store: &AnnotationStore) -> Vec<DocumentProgress> {
    corpus
        .documents()
        .iter()
        .map(|doc| {
            let completeness = store.completeness(&doc.doc_id, &corpus.expected_keys(&doc.doc_id));
            DocumentProgress {
                doc_id: doc.doc_id.clone(),
                expected: completeness.expected_len(),
                done: completeness.done.len(),
                remaining: completeness.remaining.len(),
                complete: completeness.is_complete(),
            }
        })
        .collect()
}

pub fn build_report(workspace: &Workspace) -> ProgressReport {
    let documents = document_progress(&workspace.corpus, &workspace.store);

    ProgressReport {
        report_version: 1,
        generated_at: now_utc_string(),
        annotator: workspace.session.annotator.clone(),
        experiment: workspace.session.experiment.clone(),
        labels_path: workspace.store.path().display().to_string(),
        annotated_rows: workspace.store.table().len(),
        document_count: documents.len(),
        complete_document_count: documents.iter().filter(|doc| doc.complete).count(),
        documents,
    }
}
