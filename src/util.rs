use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{LabelError, LabelResult};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Writes `path` through a temp file in the same directory and a rename, so
/// readers see either the previous file or the complete new one.
pub fn write_atomically<F>(path: &Path, fill: F) -> LabelResult<()>
where
    F: FnOnce(&mut NamedTempFile) -> LabelResult<()>,
{
    let io_err = |source| LabelError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    fill(&mut temp)?;
    temp.as_file_mut().flush().map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|err| io_err(err.error))?;

    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    write_atomically(path, |file| {
        file.write_all(&data)
            .and_then(|()| file.write_all(b"\n"))
            .map_err(|source| LabelError::Io {
                path: path.to_path_buf(),
                source,
            })
    })
    .with_context(|| format!("failed to write json file: {}", path.display()))?;

    Ok(())
}
