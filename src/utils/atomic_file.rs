use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Replaces `path` with whatever `write` produces.
///
/// The content goes to a temporary file next to `path` which is then renamed
/// over it, so readers never see a half-written file and a failed write leaves
/// the old content in place. An existing file keeps its permissions.
pub fn replace_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Replaces `path` with `contents`.
pub fn write(path: &Path, contents: &[u8]) -> Result<()> {
    replace_with(path, |out| Ok(out.write_all(contents)?))
}
