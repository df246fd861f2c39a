use anyhow::{Context, Result, bail};
use tracing::info;

use crate::category::category_column;
use crate::cli::SubmitArgs;
use crate::commands::{Workspace, open_workspace};
use crate::model::AnnotationRecord;
use crate::store::{Completeness, UpsertOutcome};

pub fn run(args: SubmitArgs) -> Result<()> {
    let mut workspace = open_workspace(&args.session)?;
    submit(&mut workspace, &args)?;
    Ok(())
}

/// Validates one form submission, persists it and reports the document's
/// remaining work. Nothing is written when validation fails.
pub fn submit(
    workspace: &mut Workspace,
    args: &SubmitArgs,
) -> Result<(UpsertOutcome, Completeness)> {
    let qrc = match (&args.q_id, args.question) {
        (Some(q_id), _) => workspace.corpus.find_question(
            &args.doc_id,
            q_id,
            args.is_confusing.map(|flag| flag.as_str()),
        )?,
        (None, Some(position)) => workspace.corpus.question_at(&args.doc_id, position)?,
        (None, None) => bail!("either --q-id or --question is required"),
    };

    let question_category = category_column(&args.categories, args.other_text.as_deref())?;
    let record = AnnotationRecord::from_qrc(qrc, args.confusing, args.defused, question_category);
    let key = record.key();

    let outcome = workspace.store.upsert(record).with_context(|| {
        format!(
            "failed to save annotation for doc_id {} q_id {}",
            key.doc_id, key.q_id
        )
    })?;

    match outcome {
        UpsertOutcome::Created => info!(
            doc_id = %key.doc_id,
            q_id = %key.q_id,
            supposed_to_be_confusing = %key.supposed_to_be_confusing,
            "annotation submitted"
        ),
        UpsertOutcome::Overwritten => info!(
            doc_id = %key.doc_id,
            q_id = %key.q_id,
            supposed_to_be_confusing = %key.supposed_to_be_confusing,
            "overwrote previous annotation"
        ),
    }

    let expected = workspace.corpus.expected_keys(&key.doc_id);
    let completeness = workspace.store.completeness(&key.doc_id, &expected);
    if completeness.is_complete() {
        info!(doc_id = %key.doc_id, "all questions for document annotated");
    } else {
        info!(
            doc_id = %key.doc_id,
            remaining = completeness.remaining.len(),
            "questions remaining to annotate"
        );
    }

    Ok((outcome, completeness))
}
