//! mailgrab — fetch image attachments from an IMAP mailbox.
//!
//! This crate provides the core library: walking server-reported MIME body
//! structures, fetching addressed parts, saving attachments to disk and
//! sequencing the per-message mark/dispose workflow.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod walker;
pub mod writer;
