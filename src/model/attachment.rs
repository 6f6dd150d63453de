//! Attachment descriptors and fetched attachments.

/// Address and identity of one attachment part inside a body structure.
///
/// Produced by the walker for every leaf that resolves a non-empty
/// filename. The `path` is the 1-based pre-order address of the leaf; an
/// empty path means the message itself is the (single) part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    /// IMAP section path, e.g. `[2, 1]` for `BODY[2.1]`.
    pub path: Vec<u32>,
    /// Lowercased `type/subtype`, e.g. `"image/png"`.
    pub mime_type: String,
    /// Declared filename, exactly as reported (sanitized only at save time).
    pub filename: String,
}

/// A descriptor combined with its fetched bytes.
///
/// Ephemeral: exists only between the part fetch and the save.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Whether the given MIME type declares an image, case-insensitively.
pub fn is_image_mime(mime_type: &str) -> bool {
    let lower = mime_type.to_ascii_lowercase();
    lower.starts_with("image/")
}

/// Keep only attachments whose declared MIME type is `image/*`.
///
/// Order is preserved.
pub fn filter_images(attachments: Vec<Attachment>) -> Vec<Attachment> {
    attachments
        .into_iter()
        .filter(|a| is_image_mime(&a.mime_type))
        .collect()
}
