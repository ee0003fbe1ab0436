//! Writing export artifacts to disk.

use crate::error::{MatcherError, Result};
use gazette_matcher_common::{ExportArtifact, ExportFormat, Session};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Export the filtered records of `session` into `output_dir`.
///
/// The file is named from `timestamp_ms`; an existing file is never
/// replaced, a `-1`, `-2`, ... suffix is tried instead.
pub fn write_export(
    session: &Session,
    format: ExportFormat,
    output_dir: &Path,
    timestamp_ms: i64,
) -> Result<(PathBuf, ExportArtifact)> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(MatcherError::InvalidExportDir(output_dir.display().to_string()));
    }
    std::fs::create_dir_all(output_dir)?;

    let artifact = session.export(format, timestamp_ms)?;
    let path = write_new_file(output_dir, &artifact.file_name, &artifact.bytes)?;
    debug!(path = %path.display(), rows = artifact.rows, "export written");
    Ok((path, artifact))
}

fn write_new_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let name = Path::new(file_name);
    let stem = name.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = name.extension().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();

    for attempt in 0u32.. {
        let candidate = if attempt == 0 {
            dir.join(file_name)
        } else {
            dir.join(format!("{}-{}.{}", stem, attempt, ext))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(MatcherError::InvalidExportDir(dir.display().to_string()))
}
