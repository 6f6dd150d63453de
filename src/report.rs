//! Optional JSON run report.

use std::path::Path;

use serde::Serialize;

use crate::error::{MailgrabError, Result};

/// Report entry for one message that had at least one image saved.
///
/// Only fields derivable from the fetched envelope are emitted.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub subject: String,
    /// Declared filenames of the images saved for this message.
    pub images: Vec<String>,
}

/// Write the report as a pretty-printed JSON array.
///
/// The caller decides whether to write at all (no entries → no file) and
/// treats a failure here as non-fatal: the report is supplementary.
pub fn write_report(path: &Path, entries: &[MessageReport]) -> Result<()> {
    let json = serde_json::to_vec_pretty(entries).map_err(|e| {
        MailgrabError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    std::fs::write(path, json).map_err(|e| MailgrabError::io(path, e))?;
    Ok(())
}
