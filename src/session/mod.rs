//! Mailbox session abstraction.
//!
//! The pipeline drives the server exclusively through the [`MailSession`]
//! trait, so it can be exercised in tests with a scripted implementation
//! and no live server. The real thing lives in [`imap`].

pub mod imap;

pub use self::imap::ImapSession;

use crate::error::Result;
use crate::model::message::MessageMeta;

/// Custom keyword flag marking a message as handled by this tool.
///
/// Deliberately distinct from `\Seen`: processing never alters the
/// user-visible read state. Requires a server that accepts arbitrary
/// keyword flags.
pub const PROCESSED_KEYWORD: &str = "mailgrab-processed";

/// Capability interface over the remote mailbox.
///
/// One selected mailbox, one connection, strict request/response
/// discipline: every call blocks until its response is complete.
pub trait MailSession {
    /// Select the mailbox all further operations apply to.
    fn select(&mut self, mailbox: &str) -> Result<()>;

    /// Sequence numbers of messages lacking the marker keyword.
    /// An empty result is a normal outcome, not an error.
    fn search_unprocessed(&mut self) -> Result<Vec<u32>>;

    /// One round trip fetching UID, subject and body structure for the
    /// whole batch of sequence numbers.
    fn fetch_envelope_and_structure(&mut self, seqs: &[u32]) -> Result<Vec<MessageMeta>>;

    /// Fetch the raw bytes of one addressed part. `Ok(None)` means the
    /// server reported no data for that section — nothing to save.
    fn fetch_part(&mut self, uid: u32, path: &[u32]) -> Result<Option<Vec<u8>>>;

    /// Idempotently set the marker keyword on a message, silently.
    fn mark_processed(&mut self, uid: u32) -> Result<()>;

    /// Flag a message `\Deleted` and expunge it.
    fn delete(&mut self, uid: u32) -> Result<()>;

    /// Server-side move to another mailbox.
    fn move_to(&mut self, uid: u32, mailbox: &str) -> Result<()>;

    /// Log out and release the transport. Idempotent; safe to call after
    /// a prior error.
    fn close(&mut self);
}

/// Render a part path as an IMAP section specifier, e.g. `[2, 1]` → `"2.1"`.
///
/// The empty path addresses the whole message.
pub fn section_spec(path: &[u32]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
