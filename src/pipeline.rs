//! Per-message processing workflow.
//!
//! The run is two-phased to keep the conservative batch policy: first
//! every attachment part of every matched message is fetched (any failure
//! here discards the whole batch — nothing has been saved or marked yet),
//! then messages are processed one by one with non-fatal per-item error
//! handling.

use std::fs;

use crate::config::{PostAction, Settings};
use crate::error::{MailgrabError, Result};
use crate::model::attachment::{filter_images, Attachment};
use crate::model::message::Message;
use crate::report::MessageReport;
use crate::session::MailSession;
use crate::walker;
use crate::writer;

/// Workflow state of one message, advanced in order.
///
/// Kept explicit (rather than implicit in control flow) so the processing
/// sequence is inspectable in debug logs and extensible toward resumable
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Fetched,
    StructureWalked,
    PartsFetched,
    Saved,
    MarkedProcessed,
    PostActionApplied,
    PostActionSkipped,
    Done,
}

/// Aggregate result of one run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Messages handled this pass, whether or not anything was saved.
    pub messages_processed: usize,
    /// Image attachments successfully written to disk.
    pub images_saved: usize,
    /// One entry per message that had at least one image saved.
    pub reports: Vec<MessageReport>,
}

/// Run the whole pipeline over one selected mailbox.
///
/// Fatal errors (selection, search, envelope/structure fetch, any part
/// fetch, output-directory creation) abort the run. Save, mark and
/// post-action failures are logged and the loop continues.
pub fn run<S: MailSession>(session: &mut S, settings: &Settings) -> Result<RunOutcome> {
    session.select(&settings.mailbox)?;

    let seqs = session.search_unprocessed()?;
    if seqs.is_empty() {
        tracing::info!("No unprocessed messages found");
        return Ok(RunOutcome::default());
    }
    tracing::info!(count = seqs.len(), "Found unprocessed message(s)");

    let messages = collect_messages(session, &seqs)?;
    process_messages(session, settings, messages)
}

/// Phase 1: batch envelope/structure fetch, then every attachment part.
///
/// Errors propagate and abort the entire batch: partial extraction results
/// are discarded rather than silently under-reported.
fn collect_messages<S: MailSession>(session: &mut S, seqs: &[u32]) -> Result<Vec<Message>> {
    let metas = session.fetch_envelope_and_structure(seqs)?;

    let mut messages = Vec::with_capacity(metas.len());
    for meta in metas {
        let state = advance(meta.uid, MessageState::Fetched, MessageState::StructureWalked);

        let descriptors = meta
            .structure
            .as_ref()
            .map(walker::find_attachments)
            .unwrap_or_default();

        let mut attachments = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match session.fetch_part(meta.uid, &descriptor.path)? {
                Some(data) => attachments.push(Attachment {
                    filename: descriptor.filename.clone(),
                    mime_type: descriptor.mime_type.clone(),
                    data,
                }),
                None => tracing::debug!(
                    uid = meta.uid,
                    section = %crate::session::section_spec(&descriptor.path),
                    "No data for part, skipping"
                ),
            }
        }
        advance(meta.uid, state, MessageState::PartsFetched);

        messages.push(Message {
            uid: meta.uid,
            subject: meta.subject,
            attachments,
        });
    }
    Ok(messages)
}

/// Phase 2: filter, save, mark and dispose, message by message.
fn process_messages<S: MailSession>(
    session: &mut S,
    settings: &Settings,
    messages: Vec<Message>,
) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::default();
    // The output directory is created lazily, once per run, on the first
    // save. A run that finds no images never touches the filesystem.
    let mut output_dir_ready = false;

    for message in messages {
        let mut state = MessageState::PartsFetched;
        let images = filter_images(message.attachments);

        let mut saved: Vec<String> = Vec::new();
        for attachment in &images {
            if !output_dir_ready {
                fs::create_dir_all(&settings.output)
                    .map_err(|e| MailgrabError::io(&settings.output, e))?;
                output_dir_ready = true;
            }

            match writer::save(&settings.output, attachment) {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "Saved attachment");
                    saved.push(attachment.filename.clone());
                }
                Err(e) => {
                    tracing::error!(
                        uid = message.uid,
                        filename = %attachment.filename,
                        error = %e,
                        "Failed to save attachment"
                    );
                }
            }
        }
        state = advance(message.uid, state, MessageState::Saved);

        tracing::info!(
            uid = message.uid,
            subject = %message.subject,
            saved = saved.len(),
            "Message handled"
        );

        // A mark failure leaves the message unflagged: it will be picked up
        // again on the next run, at the cost of duplicate saved files.
        let marked = match session.mark_processed(message.uid) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(uid = message.uid, error = %e, "Failed to mark message processed");
                false
            }
        };

        if marked {
            state = advance(message.uid, state, MessageState::MarkedProcessed);
            state = apply_post_action(session, settings, message.uid, state);
        } else {
            state = advance(message.uid, state, MessageState::PostActionSkipped);
        }
        advance(message.uid, state, MessageState::Done);

        outcome.messages_processed += 1;
        outcome.images_saved += saved.len();
        if !saved.is_empty() {
            outcome.reports.push(MessageReport {
                subject: message.subject,
                images: saved,
            });
        }
    }

    Ok(outcome)
}

/// Apply the configured disposal action. Failures are logged and never
/// retried within the run.
fn apply_post_action<S: MailSession>(
    session: &mut S,
    settings: &Settings,
    uid: u32,
    state: MessageState,
) -> MessageState {
    let result = match settings.post_action {
        PostAction::None => return advance(uid, state, MessageState::PostActionSkipped),
        PostAction::Delete => session.delete(uid),
        PostAction::Move => {
            // Validation guarantees a destination when the action is Move.
            let destination = settings.move_to.as_deref().unwrap_or_default();
            session.move_to(uid, destination)
        }
    };

    match result {
        Ok(()) => advance(uid, state, MessageState::PostActionApplied),
        Err(e) => {
            tracing::error!(uid, error = %e, "Post-action failed");
            advance(uid, state, MessageState::PostActionSkipped)
        }
    }
}

fn advance(uid: u32, from: MessageState, to: MessageState) -> MessageState {
    tracing::debug!(uid, ?from, ?to, "Message state");
    to
}
