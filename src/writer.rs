//! Persist attachments to the output directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{MailgrabError, Result};
use crate::model::attachment::Attachment;

/// Save one attachment into `output_dir`, returning the path actually used.
///
/// The write is all-or-nothing: bytes go to a temp file in the same
/// directory which is then renamed into place, so a partial file is never
/// observable at the target path. An existing file with the same name is
/// silently overwritten.
pub fn save(output_dir: &Path, attachment: &Attachment) -> Result<PathBuf> {
    let filename = sanitize_filename(&attachment.filename);
    let path = output_dir.join(filename);

    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)
        .map_err(|e| MailgrabError::io(output_dir, e))?;
    tmp.write_all(&attachment.data)
        .map_err(|e| MailgrabError::io(&path, e))?;
    tmp.persist(&path)
        .map_err(|e| MailgrabError::io(&path, e.error))?;

    Ok(path)
}

/// Reduce a declared attachment filename to a safe final path component.
///
/// Any directory part is discarded to neutralize path traversal. A name
/// that reduces to nothing (empty, `.`, `..`, a bare separator) becomes
/// the literal `attachment`.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if base.is_empty() || base == "." {
        "attachment".to_string()
    } else {
        base.to_string()
    }
}
