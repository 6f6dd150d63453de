//! Message types at the two stages of the pipeline.

use super::attachment::Attachment;
use super::mime::MimeNode;

/// Result of the batch envelope+structure fetch for one message.
///
/// The UID is stable within the mailbox across sessions; the structure is a
/// snapshot and may differ if the message changes remotely between fetches
/// (not guarded against).
#[derive(Debug, Clone)]
pub struct MessageMeta {
    pub uid: u32,
    pub subject: String,
    /// `None` when the server returned no BODYSTRUCTURE for the message.
    pub structure: Option<MimeNode>,
}

/// A message with all of its attachment parts fetched.
///
/// Consumed once per pipeline pass; never mutated locally — mutation happens
/// server-side via flags or move.
#[derive(Debug, Clone)]
pub struct Message {
    pub uid: u32,
    pub subject: String,
    pub attachments: Vec<Attachment>,
}
