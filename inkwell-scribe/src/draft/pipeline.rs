//! Submission Pipeline: drives one draft from upload to stored entry
//!
//! The draft lives behind a single async mutex. The lock is never held across a
//! capability call: every operation takes it to check guards and stage work, releases
//! it for the remote call, then takes it again to write the result back. Write-back
//! is where stale results are detected and dropped:
//!
//! - transcriptions are addressed by [`PageToken`], so a result for a deleted page is
//!   a no-op and can never land on a neighbour
//! - title inference remembers the draft epoch it was dispatched under; a result
//!   from before a reset, or after a manual edit, is discarded
//!
//! Phase is derived from two explicit sub-machines ([`TitleInference`] and
//! [`SubmitGate`]) plus the page collection, so single-flight is enforced by the
//! transition guards rather than by loose flags.
//!
//! Remote calls run on spawned tasks. Dropping the future of `append` or `submit`
//! (a client disconnect, for instance) therefore never leaves a page pending or the
//! gate stuck in flight.

use futures::future::join_all;
use inkwell_common::{JournalEntry, NewJournalEntry, OwnerId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::pages::{CursorMove, PageCollection, PageToken, Transcription, WriteBack};
use super::upload::{validate_batch, UploadedImage};
use super::{PipelineError, ValidationError};
use crate::capability::{Capabilities, CapabilityError, ImagePayload, SummaryMode};

/// Observable phase of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Idle,
    Uploading,
    AwaitingTitle,
    ReadyToSubmit,
    Submitting,
    Submitted,
    SubmitFailed,
}

/// Automatic title inference, at most once per draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleInference {
    NotRequested,
    InFlight,
    Generated,
    Failed,
    /// The user edited the title; no automatic result may overwrite it
    Manual,
}

/// Title status as exposed in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleStatus {
    Empty,
    Generating,
    Generated,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmitGate {
    Idle,
    InFlight,
    Failed { reason: String },
    Succeeded { entry_id: Uuid },
}

#[derive(Debug)]
struct DraftState {
    pages: PageCollection,
    title: String,
    title_inference: TitleInference,
    submission: SubmitGate,
    /// Bumped on every reset after a successful submission
    epoch: u64,
}

impl DraftState {
    fn new() -> Self {
        Self {
            pages: PageCollection::new(),
            title: String::new(),
            title_inference: TitleInference::NotRequested,
            submission: SubmitGate::Idle,
            epoch: 0,
        }
    }

    fn phase(&self) -> DraftPhase {
        match &self.submission {
            SubmitGate::InFlight => return DraftPhase::Submitting,
            SubmitGate::Failed { .. } => return DraftPhase::SubmitFailed,
            SubmitGate::Succeeded { .. } if self.pages.is_empty() => return DraftPhase::Submitted,
            _ => {}
        }

        if self.pages.is_empty() {
            DraftPhase::Idle
        } else if self.pages.has_pending() {
            DraftPhase::Uploading
        } else if self.title_inference == TitleInference::InFlight {
            DraftPhase::AwaitingTitle
        } else {
            DraftPhase::ReadyToSubmit
        }
    }

    fn title_status(&self) -> TitleStatus {
        match self.title_inference {
            TitleInference::InFlight => TitleStatus::Generating,
            TitleInference::Manual => TitleStatus::Manual,
            TitleInference::Generated => TitleStatus::Generated,
            TitleInference::NotRequested | TitleInference::Failed => TitleStatus::Empty,
        }
    }

    fn ensure_editable(&self) -> Result<(), PipelineError> {
        if self.submission == SubmitGate::InFlight {
            return Err(PipelineError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Nothing the owner could come back to
    fn is_vacant(&self) -> bool {
        self.pages.is_empty()
            && self.title.is_empty()
            && self.title_inference == TitleInference::NotRequested
            && matches!(self.submission, SubmitGate::Idle | SubmitGate::Succeeded { .. })
    }

    fn reset(&mut self) {
        self.pages.clear();
        self.title.clear();
        self.title_inference = TitleInference::NotRequested;
        self.epoch += 1;
    }
}

/// Per-page status as exposed in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Pending,
    Transcribed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub token: PageToken,
    pub position: usize,
    pub file_name: String,
    pub status: PageStatus,
    pub text: Option<String>,
}

/// Serialisable view of a draft at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSnapshot {
    pub phase: DraftPhase,
    pub title: String,
    pub title_status: TitleStatus,
    pub cursor: Option<usize>,
    pub pages: Vec<PageView>,
    /// Reason of the last failed submission, until acknowledged
    pub error: Option<String>,
    /// Entry created by the last successful submission
    pub submitted_entry_id: Option<Uuid>,
}

struct PipelineInner {
    owner: OwnerId,
    capabilities: Capabilities,
    draft: Mutex<DraftState>,
}

/// Handle to one owner's draft; clones share the same draft
#[derive(Clone)]
pub struct SubmissionPipeline {
    inner: Arc<PipelineInner>,
}

impl SubmissionPipeline {
    pub fn new(owner: OwnerId, capabilities: Capabilities) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                owner,
                capabilities,
                draft: Mutex::new(DraftState::new()),
            }),
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.inner.owner
    }

    /// Validate and append images, then wait for every transcription to resolve
    ///
    /// The whole batch is rejected, before any capability call, when one file is not
    /// an allowed image.
    pub async fn append(&self, uploads: Vec<UploadedImage>) -> Result<Vec<PageToken>, PipelineError> {
        let staged = self.stage(uploads).await?;
        let tokens = staged.iter().map(|(token, _)| *token).collect();

        if let Err(e) = self.spawn_transcriptions(staged).await {
            tracing::error!(owner = %self.inner.owner, error = %e, "Transcription task failed");
            return Err(PipelineError::Internal(e.to_string()));
        }
        Ok(tokens)
    }

    /// Validate and append images; transcription continues in the background
    pub async fn append_detached(&self, uploads: Vec<UploadedImage>) -> Result<Vec<PageToken>, PipelineError> {
        let staged = self.stage(uploads).await?;
        let tokens = staged.iter().map(|(token, _)| *token).collect();
        drop(self.spawn_transcriptions(staged));
        Ok(tokens)
    }

    async fn stage(&self, uploads: Vec<UploadedImage>) -> Result<Vec<(PageToken, ImagePayload)>, PipelineError> {
        let images = validate_batch(uploads)?;

        let mut draft = self.inner.draft.lock().await;
        draft.ensure_editable()?;
        if images.is_empty() {
            return Ok(Vec::new());
        }

        if matches!(draft.submission, SubmitGate::Succeeded { .. }) {
            draft.submission = SubmitGate::Idle;
        }

        let tokens = draft.pages.append(images.clone());
        tracing::info!(
            owner = %self.inner.owner,
            count = tokens.len(),
            total = draft.pages.len(),
            "Pages appended, starting transcription"
        );
        Ok(tokens.into_iter().zip(images).collect())
    }

    fn spawn_transcriptions(&self, staged: Vec<(PageToken, ImagePayload)>) -> tokio::task::JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            let calls = staged.into_iter().map(|(token, image)| {
                let pipeline = pipeline.clone();
                async move {
                    let result = pipeline.inner.capabilities.transcriber.transcribe(&image).await;
                    pipeline.write_back(token, result).await;
                }
            });
            join_all(calls).await;
        })
    }

    async fn write_back(&self, token: PageToken, result: Result<String, CapabilityError>) {
        {
            let mut draft = self.inner.draft.lock().await;
            let result = result.map_err(|e| {
                tracing::warn!(%token, error = %e, "Transcription failed");
                e.to_string()
            });
            if draft.pages.set_transcription(token, result) != WriteBack::Applied {
                return;
            }
        }

        self.maybe_infer_title().await;
    }

    /// Issue the single automatic title request if its preconditions hold
    async fn maybe_infer_title(&self) {
        let (content, epoch) = {
            let mut draft = self.inner.draft.lock().await;
            if draft.title_inference != TitleInference::NotRequested
                || !draft.title.trim().is_empty()
                || !draft.pages.has_resolved()
            {
                return;
            }
            draft.title_inference = TitleInference::InFlight;
            (draft.pages.combined_content(), draft.epoch)
        };

        tracing::debug!(owner = %self.inner.owner, epoch, "Requesting title");
        let result = self
            .inner
            .capabilities
            .summarizer
            .summarize(&content, SummaryMode::Title)
            .await;

        let mut draft = self.inner.draft.lock().await;
        if draft.epoch != epoch || draft.title_inference != TitleInference::InFlight {
            tracing::debug!(owner = %self.inner.owner, epoch, "Discarding stale title");
            return;
        }

        match result {
            Ok(title) => {
                draft.title = title;
                draft.title_inference = TitleInference::Generated;
            }
            Err(e) => {
                tracing::warn!(owner = %self.inner.owner, error = %e, "Title inference failed");
                draft.title_inference = TitleInference::Failed;
            }
        }
    }

    /// Delete the page at `index`
    pub async fn delete_page(&self, index: usize) -> Result<PageToken, PipelineError> {
        let mut draft = self.inner.draft.lock().await;
        draft.ensure_editable()?;
        let removed = draft.pages.delete_at(index).ok_or(PipelineError::PageNotFound(index))?;
        tracing::info!(owner = %self.inner.owner, token = %removed.token, index, "Page deleted");
        Ok(removed.token)
    }

    pub async fn move_cursor(&self, movement: CursorMove) -> Option<usize> {
        self.inner.draft.lock().await.pages.move_cursor(movement)
    }

    /// Manual title edit; suppresses automatic titles for the rest of this draft
    pub async fn set_title(&self, title: impl Into<String>) -> Result<(), PipelineError> {
        let mut draft = self.inner.draft.lock().await;
        draft.ensure_editable()?;
        draft.title = title.into();
        draft.title_inference = TitleInference::Manual;
        Ok(())
    }

    /// Store the draft as one journal entry
    ///
    /// Rejected while another submission is in flight. On success the draft is reset;
    /// on failure it is left untouched for a retry.
    pub async fn submit(&self) -> Result<JournalEntry, PipelineError> {
        let entry = {
            let mut draft = self.inner.draft.lock().await;
            if draft.submission == SubmitGate::InFlight {
                tracing::debug!(owner = %self.inner.owner, "Rejecting concurrent submit");
                return Err(PipelineError::SubmissionInFlight);
            }

            let title = draft.title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::EmptyTitle.into());
            }
            if draft.pages.is_empty() {
                return Err(ValidationError::NoPages.into());
            }
            if draft.pages.has_pending() {
                return Err(PipelineError::TranscriptionPending);
            }

            draft.submission = SubmitGate::InFlight;
            NewJournalEntry {
                title,
                content: draft.pages.combined_content(),
                created_at: None,
            }
        };

        let pipeline = self.clone();
        let task = tokio::spawn(async move {
            let result = pipeline
                .inner
                .capabilities
                .store
                .create_journal_entry(&pipeline.inner.owner, entry)
                .await;
            pipeline.finish_submission(result).await
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = format!("Submission task failed: {}", e);
                tracing::error!(owner = %self.inner.owner, error = %e, "Submission task failed");
                let mut draft = self.inner.draft.lock().await;
                if draft.submission == SubmitGate::InFlight {
                    draft.submission = SubmitGate::Failed { reason: reason.clone() };
                }
                Err(PipelineError::Internal(reason))
            }
        }
    }

    async fn finish_submission(
        &self,
        result: Result<JournalEntry, CapabilityError>,
    ) -> Result<JournalEntry, PipelineError> {
        let mut draft = self.inner.draft.lock().await;
        match result {
            Ok(entry) => {
                draft.reset();
                draft.submission = SubmitGate::Succeeded { entry_id: entry.id };
                tracing::info!(owner = %self.inner.owner, entry_id = %entry.id, "Entry submitted");
                Ok(entry)
            }
            Err(e) => {
                tracing::error!(owner = %self.inner.owner, error = %e, "Submission failed");
                draft.submission = SubmitGate::Failed { reason: e.to_string() };
                Err(PipelineError::Capability(e))
            }
        }
    }

    /// Dismiss a failed submission; returns false when there was nothing to dismiss
    pub async fn acknowledge_failure(&self) -> bool {
        let mut draft = self.inner.draft.lock().await;
        if matches!(draft.submission, SubmitGate::Failed { .. }) {
            draft.submission = SubmitGate::Idle;
            true
        } else {
            false
        }
    }

    /// True when the draft holds nothing and no request or task shares this handle
    ///
    /// Only stable while no new handle can be cloned out, e.g. under the owner map's
    /// write lock.
    pub fn is_vacant(&self) -> bool {
        if Arc::strong_count(&self.inner) > 1 {
            return false;
        }
        self.inner
            .draft
            .try_lock()
            .map(|draft| draft.is_vacant())
            .unwrap_or(false)
    }

    pub async fn phase(&self) -> DraftPhase {
        self.inner.draft.lock().await.phase()
    }

    pub async fn snapshot(&self) -> DraftSnapshot {
        let draft = self.inner.draft.lock().await;
        let pages = draft
            .pages
            .iter()
            .enumerate()
            .map(|(position, page)| PageView {
                token: page.token,
                position,
                file_name: page.source.file_name.clone(),
                status: match page.transcription {
                    Transcription::Pending => PageStatus::Pending,
                    Transcription::Text(_) => PageStatus::Transcribed,
                    Transcription::Failed { .. } => PageStatus::Failed,
                },
                text: page.transcription.display_text().map(String::from),
            })
            .collect();

        DraftSnapshot {
            phase: draft.phase(),
            title: draft.title.clone(),
            title_status: draft.title_status(),
            cursor: draft.pages.cursor(),
            pages,
            error: match &draft.submission {
                SubmitGate::Failed { reason } => Some(reason.clone()),
                _ => None,
            },
            submitted_entry_id: match &draft.submission {
                SubmitGate::Succeeded { entry_id } => Some(*entry_id),
                _ => None,
            },
        }
    }
}
