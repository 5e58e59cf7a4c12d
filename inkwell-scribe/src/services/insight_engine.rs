//! Insight Engine: analysis across an owner's whole journal
//!
//! Entries are fetched on the first analysis request and reused for every later
//! mode until the engine is dropped.

use inkwell_common::models::join_content;
use inkwell_common::{JournalEntry, OwnerId};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::insight_parser::{parse_insights, InsightItem};
use super::InsightError;
use crate::capability::{Capabilities, InsightMode};

pub struct InsightEngine {
    owner: OwnerId,
    capabilities: Capabilities,
    entries: OnceCell<Arc<Vec<JournalEntry>>>,
}

impl InsightEngine {
    pub fn new(owner: OwnerId, capabilities: Capabilities) -> Self {
        Self {
            owner,
            capabilities,
            entries: OnceCell::new(),
        }
    }

    /// Cached entries, fetching them on first use
    ///
    /// A failed fetch is not cached; the next call tries again.
    pub async fn entries(&self) -> Result<Arc<Vec<JournalEntry>>, InsightError> {
        let entries = self
            .entries
            .get_or_try_init(|| async {
                let entries = self.capabilities.store.list_journal_entries(&self.owner).await?;
                tracing::debug!(owner = %self.owner, count = entries.len(), "Entries cached for analysis");
                Ok::<_, InsightError>(Arc::new(entries))
            })
            .await?;
        Ok(entries.clone())
    }

    pub fn is_cached(&self) -> bool {
        self.entries.initialized()
    }

    /// Run one analysis mode over every entry
    pub async fn analyze(&self, mode: InsightMode) -> Result<Vec<InsightItem>, InsightError> {
        let cached = self.is_cached();
        let entries = self.entries().await?;
        if entries.is_empty() {
            return Err(InsightError::NoEntries);
        }

        let combined = join_content(entries.iter().map(|e| e.content.as_str()));
        tracing::info!(
            owner = %self.owner,
            mode = %mode,
            entries = entries.len(),
            cached,
            "Analyzing journal"
        );

        let raw = self
            .capabilities
            .summarizer
            .summarize(&combined, mode.summary_mode())
            .await?;

        let items = parse_insights(&raw);
        if items.is_empty() {
            tracing::warn!(owner = %self.owner, mode = %mode, "Analysis produced no insights");
            return Err(InsightError::NoInsights);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityError, ImagePayload, JournalStore, Summarizer, SummaryMode, Transcriber};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use inkwell_common::NewJournalEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct NoTranscriber;

    #[async_trait]
    impl Transcriber for NoTranscriber {
        async fn transcribe(&self, _image: &ImagePayload) -> Result<String, CapabilityError> {
            Err(CapabilityError::Network("unused".into()))
        }
    }

    struct ScriptedSummarizer {
        reply: String,
        seen: Mutex<Vec<(String, SummaryMode)>>,
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn summarize(&self, text: &str, mode: SummaryMode) -> Result<String, CapabilityError> {
            self.seen.lock().unwrap().push((text.to_string(), mode));
            Ok(self.reply.clone())
        }
    }

    struct CountingStore {
        contents: Vec<&'static str>,
        lists: AtomicUsize,
    }

    #[async_trait]
    impl JournalStore for CountingStore {
        async fn create_raw_transcription(
            &self,
            _owner: &OwnerId,
            _content: &str,
            _files: &[String],
            _created_at: DateTime<Utc>,
        ) -> Result<Uuid, CapabilityError> {
            Ok(Uuid::new_v4())
        }

        async fn create_journal_entry(
            &self,
            _owner: &OwnerId,
            _entry: NewJournalEntry,
        ) -> Result<JournalEntry, CapabilityError> {
            Err(CapabilityError::Store("read only".into()))
        }

        async fn list_journal_entries(&self, owner: &OwnerId) -> Result<Vec<JournalEntry>, CapabilityError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .contents
                .iter()
                .map(|c| JournalEntry {
                    id: Uuid::new_v4(),
                    title: "t".to_string(),
                    content: c.to_string(),
                    created_at: Utc::now(),
                    owner_id: owner.clone(),
                })
                .collect())
        }
    }

    fn engine(contents: Vec<&'static str>, reply: &str) -> (InsightEngine, Arc<ScriptedSummarizer>, Arc<CountingStore>) {
        let summarizer = Arc::new(ScriptedSummarizer {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let store = Arc::new(CountingStore {
            contents,
            lists: AtomicUsize::new(0),
        });
        let capabilities = Capabilities::new(Arc::new(NoTranscriber), summarizer.clone(), store.clone());
        (InsightEngine::new(OwnerId::new("alice"), capabilities), summarizer, store)
    }

    #[tokio::test]
    async fn test_no_entries_fails_before_summarizing() {
        let (engine, summarizer, _) = engine(Vec::new(), "• anything");
        assert!(matches!(
            engine.analyze(InsightMode::Themes).await,
            Err(InsightError::NoEntries)
        ));
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_modes_share_one_fetch() {
        let (engine, summarizer, store) = engine(vec!["Day one", "Day two"], "• Theme: work");
        assert!(!engine.is_cached());

        engine.analyze(InsightMode::Themes).await.unwrap();
        engine.analyze(InsightMode::Mood).await.unwrap();

        assert!(engine.is_cached());
        assert_eq!(store.lists.load(Ordering::SeqCst), 1);

        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen[0], ("Day one\n\n---\n\nDay two".to_string(), SummaryMode::Themes));
        assert_eq!(seen[1].1, SummaryMode::Mood);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_no_insights() {
        let (engine, _, _) = engine(vec!["entry"], "\n  •  \n");
        assert!(matches!(
            engine.analyze(InsightMode::Goals).await,
            Err(InsightError::NoInsights)
        ));
    }

    #[tokio::test]
    async fn test_items_are_parsed() {
        let (engine, _, _) = engine(
            vec!["entry"],
            "• Theme: You write often about work\n• Focus: balance",
        );
        let items = engine.analyze(InsightMode::Focus).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].label.as_deref(), Some("Focus"));
    }
}
