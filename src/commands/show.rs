use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ShowArgs;
use crate::commands::{Workspace, open_workspace};
use crate::model::HumanLabel;

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    pub doc_id: String,
    pub document: String,
    pub expected: usize,
    pub remaining: usize,
    pub complete: bool,
    pub questions: Vec<ShownQuestion>,
}

#[derive(Debug, Serialize)]
pub struct ShownQuestion {
    /// Display position, not the q_id.
    pub position: usize,
    pub q_id: String,
    pub supposed_to_be_confusing: String,
    pub question: String,
    pub response: String,
    pub annotation: Option<ShownAnnotation>,
}

#[derive(Debug, Serialize)]
pub struct ShownAnnotation {
    pub human_confuse_label: HumanLabel,
    pub human_defuse_label: HumanLabel,
    pub question_category: String,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let workspace = open_workspace(&args.session)?;
    let response = build_response(&workspace, &args.doc_id)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize document view")?;
        writeln!(output)?;
    } else {
        write_text_response(&mut output, &response)?;
    }
    output.flush()?;
    Ok(())
}

pub fn build_response(workspace: &Workspace, doc_id: &str) -> Result<ShowResponse> {
    let document = workspace.corpus.document(doc_id)?;
    let expected = workspace.corpus.expected_keys(&document.doc_id);
    let completeness = workspace.store.completeness(&document.doc_id, &expected);

    let questions = workspace
        .corpus
        .display_questions(&document.doc_id)
        .into_iter()
        .enumerate()
        .map(|(index, qrc)| ShownQuestion {
            position: index + 1,
            q_id: qrc.q_id.clone(),
            supposed_to_be_confusing: qrc.is_confusing.clone(),
            question: qrc.question.clone(),
            response: qrc.response.clone(),
            annotation: workspace
                .store
                .table()
                .get(&qrc.key())
                .map(|row| ShownAnnotation {
                    human_confuse_label: row.human_confuse_label,
                    human_defuse_label: row.human_defuse_label,
                    question_category: row.question_category.clone(),
                }),
        })
        .collect();

    Ok(ShowResponse {
        doc_id: document.doc_id.clone(),
        document: document.document.clone(),
        expected: completeness.expected_len(),
        remaining: completeness.remaining.len(),
        complete: completeness.is_complete(),
        questions,
    })
}

fn write_text_response<W: Write>(output: &mut W, response: &ShowResponse) -> Result<()> {
    writeln!(output, "### Document: {}", response.doc_id)?;
    writeln!(output, "{}", response.document)?;
    writeln!(output)?;

    if response.questions.is_empty() {
        writeln!(output, "No questions selected for this document.")?;
        return Ok(());
    }

    for question in &response.questions {
        let mark = if question.annotation.is_some() { "✓" } else { " " };
        writeln!(
            output,
            "{mark} Question #{} (q_id={}, supposed_to_be_confusing={})",
            question.position, question.q_id, question.supposed_to_be_confusing
        )?;
        writeln!(output, "Question: {}", question.question)?;
        writeln!(output, "Response: {}", question.response)?;
        if let Some(annotation) = &question.annotation {
            writeln!(
                output,
                "Annotated: confusing={} defused={} category={:?}",
                annotation.human_confuse_label.as_str(),
                annotation.human_defuse_label.as_str(),
                annotation.question_category
            )?;
        }
        writeln!(output, "---")?;
    }

    writeln!(
        output,
        "{} of {} questions remaining",
        response.remaining, response.expected
    )?;
    Ok(())
}
