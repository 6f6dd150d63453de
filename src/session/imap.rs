//! Live IMAP session over TLS.

use std::net::TcpStream;

use imap_proto::types::{BodyStructure, SectionPath};
use native_tls::{TlsConnector, TlsStream};

use super::{section_spec, MailSession, PROCESSED_KEYWORD};
use crate::config::Settings;
use crate::error::{MailgrabError, Result};
use crate::model::message::MessageMeta;
use crate::model::mime::MimeNode;

/// A logged-in session against the configured server.
///
/// All operations run sequentially over the single connection. The
/// transport is released on every exit path: explicitly via [`close`],
/// or by `Drop` when an error unwinds past the session.
///
/// [`close`]: MailSession::close
pub struct ImapSession {
    session: imap::Session<TlsStream<TcpStream>>,
    logged_out: bool,
}

impl ImapSession {
    /// Establish the TLS transport and authenticate.
    ///
    /// On authentication failure the unauthenticated client is dropped,
    /// releasing the transport, before the error is returned.
    pub fn connect(settings: &Settings) -> Result<ImapSession> {
        let mut builder = TlsConnector::builder();
        if settings.insecure {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        let tls = builder.build().map_err(|e| MailgrabError::Connect {
            server: settings.server.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(server = %settings.server, port = settings.port, "Connecting");
        let client = imap::connect(
            (settings.server.as_str(), settings.port),
            &settings.server,
            &tls,
        )
        .map_err(|e| MailgrabError::Connect {
            server: settings.server.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(username = %settings.username, "Authenticating");
        let session = client
            .login(&settings.username, &settings.password)
            .map_err(|(e, _client)| MailgrabError::Auth {
                username: settings.username.clone(),
                reason: e.to_string(),
            })?;

        Ok(ImapSession {
            session,
            logged_out: false,
        })
    }
}

impl MailSession for ImapSession {
    fn select(&mut self, mailbox: &str) -> Result<()> {
        self.session
            .select(mailbox)
            .map_err(|e| MailgrabError::Mailbox {
                mailbox: mailbox.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn search_unprocessed(&mut self) -> Result<Vec<u32>> {
        let seqs = self
            .session
            .search(format!("NOT KEYWORD {PROCESSED_KEYWORD}"))
            .map_err(|e| MailgrabError::Search(e.to_string()))?;

        let mut seqs: Vec<u32> = seqs.into_iter().collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    fn fetch_envelope_and_structure(&mut self, seqs: &[u32]) -> Result<Vec<MessageMeta>> {
        let seq_set = seqs
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let fetches = self
            .session
            .fetch(&seq_set, "(UID ENVELOPE BODYSTRUCTURE)")
            .map_err(|e| MailgrabError::Fetch(e.to_string()))?;

        let mut metas = Vec::new();
        for fetch in fetches.iter() {
            let Some(uid) = fetch.uid else {
                continue;
            };

            let subject = fetch
                .envelope()
                .and_then(|env| env.subject.as_deref())
                .map(|b| String::from_utf8_lossy(b).trim().to_string())
                .unwrap_or_default();

            let structure = fetch.bodystructure().map(mime_node_from);

            metas.push(MessageMeta {
                uid,
                subject,
                structure,
            });
        }
        Ok(metas)
    }

    fn fetch_part(&mut self, uid: u32, path: &[u32]) -> Result<Option<Vec<u8>>> {
        let spec = section_spec(path);
        let query = format!("BODY.PEEK[{spec}]");

        let fetches = self
            .session
            .uid_fetch(uid.to_string(), &query)
            .map_err(|e| MailgrabError::FetchPart {
                uid,
                section: spec.clone(),
                reason: e.to_string(),
            })?;

        let fetch = fetches
            .iter()
            .next()
            .ok_or_else(|| MailgrabError::FetchPart {
                uid,
                section: spec.clone(),
                reason: "message not found".to_string(),
            })?;

        let data = if path.is_empty() {
            fetch.body()
        } else {
            fetch.section(&SectionPath::Part(path.to_vec(), None))
        };
        Ok(data.map(|b| b.to_vec()))
    }

    fn mark_processed(&mut self, uid: u32) -> Result<()> {
        self.session
            .uid_store(uid.to_string(), format!("+FLAGS.SILENT ({PROCESSED_KEYWORD})"))
            .map_err(|e| MailgrabError::Store {
                uid,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn delete(&mut self, uid: u32) -> Result<()> {
        self.session
            .uid_store(uid.to_string(), "+FLAGS.SILENT (\\Deleted)")
            .map_err(|e| MailgrabError::Store {
                uid,
                reason: e.to_string(),
            })?;
        self.session
            .uid_expunge(uid.to_string())
            .map_err(|e| MailgrabError::Store {
                uid,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn move_to(&mut self, uid: u32, mailbox: &str) -> Result<()> {
        self.session
            .uid_mv(uid.to_string(), mailbox)
            .map_err(|e| MailgrabError::Move {
                uid,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn close(&mut self) {
        if !self.logged_out {
            let _ = self.session.logout();
            self.logged_out = true;
        }
    }
}

impl Drop for ImapSession {
    fn drop(&mut self) {
        MailSession::close(self);
    }
}

/// Convert a parsed BODYSTRUCTURE into an owned [`MimeNode`] snapshot.
///
/// `message/rfc822` parts arrive as single parts and stay leaves; the
/// walker never descends into embedded messages.
fn mime_node_from(bs: &BodyStructure<'_>) -> MimeNode {
    match bs {
        BodyStructure::Multipart { bodies, .. } => MimeNode::Multipart {
            children: bodies.iter().map(mime_node_from).collect(),
        },
        BodyStructure::Basic { common, .. }
        | BodyStructure::Text { common, .. }
        | BodyStructure::Message { common, .. } => MimeNode::Leaf {
            content_type: common.ty.ty.to_string(),
            subtype: common.ty.subtype.to_string(),
            disposition_params: common
                .disposition
                .as_ref()
                .map(|d| owned_params(&d.params))
                .unwrap_or_default(),
            content_type_params: owned_params(&common.ty.params),
        },
    }
}

#[allow(clippy::type_complexity)]
fn owned_params(params: &Option<Vec<(&str, &str)>>) -> Vec<(String, String)> {
    params
        .as_ref()
        .map(|v| {
            v.iter()
                .map(|(k, val)| (k.to_string(), val.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
