//! Body-structure walker: locate attachment parts in a MIME tree.
//!
//! A pure, deterministic pre-order traversal over the declared structure.
//! No part contents are touched — the walker only decides WHICH sections
//! are worth fetching, and under what filename.

use crate::model::attachment::AttachmentDescriptor;
use crate::model::mime::MimeNode;

/// Find every attachment part in `root`, in pre-order.
///
/// A leaf is an attachment iff it resolves a non-empty filename: first from
/// a `Content-Disposition` parameter named `filename`, then from a
/// `Content-Type` parameter named `name`. Leaves without a filename (plain
/// text bodies, inline HTML, ...) are not emitted.
///
/// Each descriptor's `path` is the 1-based section address of the leaf; a
/// bare single-part message yields the empty path. Multiple attachments may
/// share a filename — both are emitted, disambiguation is the caller's job.
///
/// The traversal keeps an explicit stack, so pathologically deep nesting
/// cannot overflow the call stack.
pub fn find_attachments(root: &MimeNode) -> Vec<AttachmentDescriptor> {
    let mut found = Vec::new();
    let mut stack: Vec<(&MimeNode, Vec<u32>)> = vec![(root, Vec::new())];

    while let Some((node, path)) = stack.pop() {
        match node {
            MimeNode::Leaf {
                content_type,
                subtype,
                disposition_params,
                content_type_params,
            } => {
                if let Some(filename) =
                    resolve_filename(disposition_params, content_type_params)
                {
                    found.push(AttachmentDescriptor {
                        path,
                        mime_type: format!(
                            "{}/{}",
                            content_type.to_lowercase(),
                            subtype.to_lowercase()
                        ),
                        filename,
                    });
                }
            }
            MimeNode::Multipart { children } => {
                // Push in reverse so children pop in wire order (pre-order).
                for (i, child) in children.iter().enumerate().rev() {
                    let mut child_path = path.clone();
                    child_path.push(i as u32 + 1);
                    stack.push((child, child_path));
                }
            }
        }
    }

    found
}

/// Resolve the declared filename of a leaf, if any.
///
/// Parameter names are matched case-insensitively; an empty value counts
/// as absent.
fn resolve_filename(
    disposition_params: &[(String, String)],
    content_type_params: &[(String, String)],
) -> Option<String> {
    param(disposition_params, "filename").or_else(|| param(content_type_params, "name"))
}

fn param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &[u32], mime_type: &str, filename: &str) -> AttachmentDescriptor {
        AttachmentDescriptor {
            path: path.to_vec(),
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_single_part_with_name() {
        let tree = MimeNode::named_leaf("IMAGE", "JPEG", "photo.jpg");
        let parts = find_attachments(&tree);
        assert_eq!(parts, vec![descriptor(&[], "image/jpeg", "photo.jpg")]);
    }

    #[test]
    fn test_single_part_without_name() {
        let tree = MimeNode::leaf("TEXT", "PLAIN");
        assert!(find_attachments(&tree).is_empty());
    }

    #[test]
    fn test_flat_multipart_addresses_and_order() {
        let tree = MimeNode::multipart(vec![
            MimeNode::leaf("TEXT", "PLAIN"),
            MimeNode::named_leaf("IMAGE", "PNG", "a.png"),
            MimeNode::named_leaf("APPLICATION", "PDF", "b.pdf"),
        ]);

        let parts = find_attachments(&tree);

        assert_eq!(
            parts,
            vec![
                descriptor(&[2], "image/png", "a.png"),
                descriptor(&[3], "application/pdf", "b.pdf"),
            ]
        );
    }

    #[test]
    fn test_nested_multipart_addresses() {
        let tree = MimeNode::multipart(vec![
            MimeNode::leaf("TEXT", "PLAIN"),
            MimeNode::multipart(vec![
                MimeNode::leaf("TEXT", "HTML"),
                MimeNode::named_leaf("IMAGE", "GIF", "x.gif"),
            ]),
            MimeNode::named_leaf("IMAGE", "JPEG", "y.jpg"),
        ]);

        let parts = find_attachments(&tree);

        assert_eq!(
            parts,
            vec![
                descriptor(&[2, 2], "image/gif", "x.gif"),
                descriptor(&[3], "image/jpeg", "y.jpg"),
            ]
        );
    }

    #[test]
    fn test_disposition_filename_wins_over_name() {
        let tree = MimeNode::Leaf {
            content_type: "APPLICATION".to_string(),
            subtype: "OCTET-STREAM".to_string(),
            disposition_params: vec![("FILENAME".to_string(), "real.bin".to_string())],
            content_type_params: vec![("name".to_string(), "decoy.bin".to_string())],
        };
        let parts = find_attachments(&tree);
        assert_eq!(parts[0].filename, "real.bin");
    }

    #[test]
    fn test_empty_disposition_filename_falls_back_to_name() {
        let tree = MimeNode::Leaf {
            content_type: "image".to_string(),
            subtype: "png".to_string(),
            disposition_params: vec![("filename".to_string(), String::new())],
            content_type_params: vec![("name".to_string(), "fallback.png".to_string())],
        };
        let parts = find_attachments(&tree);
        assert_eq!(parts[0].filename, "fallback.png");
    }

    #[test]
    fn test_empty_multipart() {
        let tree = MimeNode::multipart(Vec::new());
        assert!(find_attachments(&tree).is_empty());
    }

    #[test]
    fn test_duplicate_filenames_both_emitted() {
        let tree = MimeNode::multipart(vec![
            MimeNode::named_leaf("IMAGE", "PNG", "same.png"),
            MimeNode::named_leaf("IMAGE", "PNG", "same.png"),
        ]);
        let parts = find_attachments(&tree);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].path, vec![1]);
        assert_eq!(parts[1].path, vec![2]);
    }

    #[test]
    fn test_adversarial_nesting_depth() {
        // A 10_000-level multipart chain would overflow a recursive walker.
        let mut tree = MimeNode::named_leaf("IMAGE", "PNG", "deep.png");
        for _ in 0..10_000 {
            tree = MimeNode::multipart(vec![tree]);
        }

        let parts = find_attachments(&tree);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].path.len(), 10_000);
        assert!(parts[0].path.iter().all(|&i| i == 1));
    }
}
