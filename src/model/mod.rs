//! Data model: MIME structure nodes, attachments and messages.

pub mod attachment;
pub mod message;
pub mod mime;
