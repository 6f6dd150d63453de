//! Server-reported MIME body structure of one message.
//!
//! This is an owned snapshot of the BODYSTRUCTURE response for a single
//! fetch. It carries no part contents — only the declared types and
//! parameters needed to locate attachments.

/// One node of the declared MIME-part tree.
///
/// A `Leaf` covers every non-multipart part, including `message/rfc822`
/// (the server reports embedded messages as single parts). `Multipart`
/// holds its children in wire order; a child's 1-based position is its
/// IMAP section number at that level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeNode {
    Leaf {
        /// Primary content type, as reported (e.g. `IMAGE`).
        content_type: String,
        /// Content subtype, as reported (e.g. `PNG`).
        subtype: String,
        /// Parameters of the `Content-Disposition` header, if any.
        disposition_params: Vec<(String, String)>,
        /// Parameters of the `Content-Type` header, if any.
        content_type_params: Vec<(String, String)>,
    },
    Multipart { children: Vec<MimeNode> },
}

impl MimeNode {
    /// Build a leaf with no parameters, useful for plain body parts.
    pub fn leaf(content_type: &str, subtype: &str) -> Self {
        Self::Leaf {
            content_type: content_type.to_string(),
            subtype: subtype.to_string(),
            disposition_params: Vec::new(),
            content_type_params: Vec::new(),
        }
    }

    /// Build a leaf whose `Content-Type` carries a `name` parameter.
    pub fn named_leaf(content_type: &str, subtype: &str, name: &str) -> Self {
        Self::Leaf {
            content_type: content_type.to_string(),
            subtype: subtype.to_string(),
            disposition_params: Vec::new(),
            content_type_params: vec![("name".to_string(), name.to_string())],
        }
    }

    /// Build a multipart node from its children.
    pub fn multipart(children: Vec<MimeNode>) -> Self {
        Self::Multipart { children }
    }
}
