//! Test Helper Utilities
//!
//! Shared utilities for testing inkwell-scribe: an in-memory app with a scripted
//! provider in place of the real vision/language API.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::Engine;
use http_body_util::BodyExt;
use inkwell_common::config::InkwellConfig;
use inkwell_common::{auth, db, OwnerId};
use inkwell_scribe::capability::{
    Capabilities, CapabilityError, ImagePayload, SqliteStore, Summarizer, SummaryMode, Transcriber,
};
use inkwell_scribe::{build_router, AppState};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub const INSIGHT_REPLY: &str = "• Theme: You write often about work\n• Focus: balance";

/// Provider fake: transcriptions by file name, fixed title and insight replies
#[derive(Default)]
pub struct ScriptedProvider {
    pub transcripts: Mutex<HashMap<String, String>>,
    pub insight_reply: Mutex<String>,
    pub summarize_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn with_transcript(&self, file_name: &str, text: &str) {
        self.transcripts
            .lock()
            .unwrap()
            .insert(file_name.to_string(), text.to_string());
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedProvider {
    async fn transcribe(&self, image: &ImagePayload) -> Result<String, CapabilityError> {
        let text = self.transcripts.lock().unwrap().get(&image.file_name).cloned();
        text.ok_or_else(|| CapabilityError::Api {
            status: 500,
            body: format!("no transcript for {}", image.file_name),
        })
    }
}

#[async_trait]
impl Summarizer for ScriptedProvider {
    async fn summarize(&self, _text: &str, mode: SummaryMode) -> Result<String, CapabilityError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        match mode {
            SummaryMode::Title => Ok("Generated Title".to_string()),
            _ => Ok(self.insight_reply.lock().unwrap().clone()),
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    pub provider: Arc<ScriptedProvider>,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::init_memory_pool().await.unwrap();
        let provider = Arc::new(ScriptedProvider::default());
        *provider.insight_reply.lock().unwrap() = INSIGHT_REPLY.to_string();

        let store = Arc::new(SqliteStore::new(pool.clone()));
        let capabilities = Capabilities::from_provider(provider.clone(), store);

        let mut config = InkwellConfig::default();
        config.capability.api_key = Some("sk-test".to_string());
        config.auth.redirect_url = Some("http://localhost:3000/journal".to_string());

        Self {
            state: AppState::new(pool, capabilities, config),
            provider,
        }
    }

    pub async fn token_for(&self, owner: &str) -> String {
        auth::issue_session(&self.state.db, &OwnerId::new(owner), chrono::Duration::hours(1))
            .await
            .unwrap()
    }

    /// Send one request; returns status and parsed JSON body (Null when empty)
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Poll the draft until `check` holds
    pub async fn wait_for_draft(&self, token: &str, check: impl Fn(&Value) -> bool) -> Value {
        for _ in 0..200 {
            let (_, draft) = self.send("GET", "/api/draft", Some(token), None).await;
            if check(&draft) {
                return draft;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("draft never reached expected state");
    }
}

/// Upload body entry for a PNG named `file_name`
pub fn png_upload(file_name: &str) -> Value {
    serde_json::json!({
        "file_name": file_name,
        "content_type": "image/png",
        "data_base64": base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC),
    })
}
