use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use crate::article::{Article, ArticleSummary, Topic};
use crate::error::{ReaderError, Result};
use crate::fetcher::ArticleSource;

pub(crate) fn summary_fixture(title: &str) -> ArticleSummary {
    ArticleSummary {
        title: title.to_string(),
        description: Some(format!("Encyclopedia entry for {title}")),
        extract: format!("{title} is a subject with a long history."),
        thumbnail_url: None,
        canonical_page_url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        kind: Some("standard".to_string()),
        last_modified: Some("2024-05-01T00:00:00Z".to_string()),
    }
}

/// In-memory article source. Unknown topics are `NotFound`; gated topics
/// wait for their `Notify` before answering.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    articles: HashMap<String, Article>,
    gates: HashMap<String, Arc<Notify>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_article(
        mut self,
        topic: &str,
        summary: ArticleSummary,
        content: &str,
    ) -> Self {
        self.articles.insert(
            topic.to_string(),
            Article {
                summary,
                content: content.to_string(),
            },
        );
        self
    }

    pub(crate) fn with_gate(mut self, topic: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(topic.to_string(), gate.clone());
        (self, gate)
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    async fn fetch(&self, topic: &Topic) -> Result<Article> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(topic.as_str()) {
            gate.notified().await;
        }
        self.articles.get(topic.as_str()).cloned().ok_or_else(|| {
            ReaderError::not_found(topic.as_str(), "Article not found (HTTP 404 Not Found)")
        })
    }
}
