//! Page Collection: the ordered pages of one in-progress entry
//!
//! Pages are addressed two ways:
//! - by position, for everything the user does (view, delete, move the cursor)
//! - by [`PageToken`], for transcription results coming back from the provider
//!
//! Tokens are handed out from a counter that only grows, including across
//! [`PageCollection::clear`], so a result for a deleted page can never land on
//! another page, not even after the draft has been reset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capability::ImagePayload;
use inkwell_common::models::join_content;

/// Text shown (and submitted) for a page whose transcription failed
pub const TRANSCRIPTION_FAILED_TEXT: &str = "Error transcribing this image";

/// Stable handle of a page, assigned at append time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(u64);

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// Transcription state of one page; leaves `Pending` exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    Pending,
    Text(String),
    Failed { reason: String },
}

impl Transcription {
    pub fn is_pending(&self) -> bool {
        matches!(self, Transcription::Pending)
    }

    /// Text as shown to the user; `None` while pending
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Transcription::Pending => None,
            Transcription::Text(text) => Some(text),
            Transcription::Failed { .. } => Some(TRANSCRIPTION_FAILED_TEXT),
        }
    }
}

/// One uploaded image and its transcription
#[derive(Debug, Clone)]
pub struct Page {
    pub token: PageToken,
    pub source: ImagePayload,
    pub transcription: Transcription,
}

/// Cursor movement request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorMove {
    /// Absolute position
    To(usize),
    /// Relative step, negative moves back
    By(isize),
}

/// Outcome of writing a transcription result back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBack {
    Applied,
    /// The page was deleted (or the draft reset) while the call was in flight
    PageGone,
    /// The page already left `Pending`
    AlreadyResolved,
}

/// Ordered pages plus the viewing cursor
///
/// Invariant: `cursor < pages.len()` whenever the collection is non-empty.
#[derive(Debug, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
    cursor: usize,
    next_token: u64,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pending page per image, in input order, at the tail
    pub fn append(&mut self, images: Vec<ImagePayload>) -> Vec<PageToken> {
        let mut tokens = Vec::with_capacity(images.len());
        for source in images {
            let token = PageToken(self.next_token);
            self.next_token += 1;
            self.pages.push(Page {
                token,
                source,
                transcription: Transcription::Pending,
            });
            tokens.push(token);
        }
        tokens
    }

    /// Resolve the transcription of the page behind `token`
    ///
    /// Results for pages that no longer exist are dropped.
    pub fn set_transcription(&mut self, token: PageToken, result: Result<String, String>) -> WriteBack {
        let Some(page) = self.pages.iter_mut().find(|p| p.token == token) else {
            tracing::debug!(%token, "Discarding transcription for page no longer in draft");
            return WriteBack::PageGone;
        };

        if !page.transcription.is_pending() {
            tracing::debug!(%token, "Ignoring second transcription result");
            return WriteBack::AlreadyResolved;
        }

        page.transcription = match result {
            Ok(text) => Transcription::Text(text),
            Err(reason) => Transcription::Failed { reason },
        };
        WriteBack::Applied
    }

    /// Remove the page at `index`; the cursor index is kept, clamped to the new last page
    pub fn delete_at(&mut self, index: usize) -> Option<Page> {
        if index >= self.pages.len() {
            return None;
        }

        let removed = self.pages.remove(index);
        self.cursor = self.cursor.min(self.pages.len().saturating_sub(1));
        Some(removed)
    }

    /// Move the cursor, clamped to `[0, len - 1]`; `None` when empty
    pub fn move_cursor(&mut self, movement: CursorMove) -> Option<usize> {
        if self.pages.is_empty() {
            return None;
        }

        let last = self.pages.len() - 1;
        self.cursor = match movement {
            CursorMove::To(position) => position.min(last),
            CursorMove::By(delta) => {
                let target = (self.cursor as i64).saturating_add(delta as i64);
                target.clamp(0, last as i64) as usize
            }
        };
        Some(self.cursor)
    }

    /// Current cursor; `None` when there are no pages
    pub fn cursor(&self) -> Option<usize> {
        (!self.pages.is_empty()).then_some(self.cursor)
    }

    #[cfg(test)]
    fn current(&self) -> Option<&Page> {
        self.cursor().and_then(|c| self.pages.get(c))
    }

    #[cfg(test)]
    fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Live position of the page behind `token`
    #[cfg(test)]
    fn position_of(&self, token: PageToken) -> Option<usize> {
        self.pages.iter().position(|p| p.token == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.pages.iter().any(|p| p.transcription.is_pending())
    }

    pub fn has_resolved(&self) -> bool {
        self.pages.iter().any(|p| !p.transcription.is_pending())
    }

    /// Resolved pages' text, in current order, joined with the entry separator
    pub fn combined_content(&self) -> String {
        join_content(self.pages.iter().filter_map(|p| p.transcription.display_text()))
    }

    /// Drop every page; tokens already issued stay retired
    pub fn clear(&mut self) {
        self.pages.clear();
        self.cursor = 0;
    }
}
