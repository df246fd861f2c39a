use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::DocsArgs;
use crate::commands::open_workspace;
use crate::commands::status::document_progress;
use crate::model::DocumentProgress;

pub fn run(args: DocsArgs) -> Result<()> {
    let workspace = open_workspace(&args.session)?;
    let progress = document_progress(&workspace.corpus, &workspace.store);

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &progress)
            .context("failed to serialize document list")?;
        writeln!(output)?;
    } else {
        write_document_list(&mut output, &progress)?;
    }
    output.flush()?;
    Ok(())
}

pub fn write_document_list<W: Write>(output: &mut W, progress: &[DocumentProgress]) -> Result<()> {
    for doc in progress {
        let mark = if doc.complete { "✓" } else { " " };
        writeln!(
            output,
            "{mark} {} ({}/{} annotated, {} remaining)",
            doc.doc_id, doc.done, doc.expected, doc.remaining
        )?;
    }
    Ok(())
}
