// File: src/publish/mod.rs

pub mod links;
pub mod snapshot_file;

use std::io::Write;
use std::path::Path;

use crate::Error;

/// Whole-file atomic replace: write to a temp file in the target directory,
/// then persist over the destination. Readers never observe a partial file.
pub(crate) fn replace_file(path: &Path, content: &str) -> Result<(), Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| Error::Io(e.error))?;
    Ok(())
}
