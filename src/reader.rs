use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::article::Topic;
use crate::config::ReaderConfig;
use crate::error::{ReaderError, Result};
use crate::fetcher::{ArticleSource, WikipediaClient};
use crate::related::RelatedTopics;
use crate::render::{ArticleView, ErrorView, LayoutKind, PageView, menu_items};
use crate::sanitize::Sanitizer;
use crate::theme::ThemeStore;

/// Identifies one load. Only the most recently issued token may replace the
/// displayed article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// The content region as currently shown.
#[derive(Debug, Clone)]
pub struct DisplayedArticle {
    pub token: LoadToken,
    pub topic: String,
    pub kind: LayoutKind,
    pub html: String,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Applied(DisplayedArticle),
    /// A newer load was issued while this one was in flight. The display was
    /// left alone; the article is still this load's own render.
    Superseded(DisplayedArticle),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied(_))
    }

    pub fn kind(&self) -> LayoutKind {
        self.article().kind
    }

    pub fn article(&self) -> &DisplayedArticle {
        match self {
            LoadOutcome::Applied(article) | LoadOutcome::Superseded(article) => article,
        }
    }

    pub fn into_article(self) -> DisplayedArticle {
        match self {
            LoadOutcome::Applied(article) | LoadOutcome::Superseded(article) => article,
        }
    }
}

/// The page controller: fetches, sanitizes, lays out and swaps the content
/// region. Every collaborator is injected.
pub struct Reader {
    source: Arc<dyn ArticleSource>,
    sanitizer: Sanitizer,
    related: RelatedTopics,
    themes: ThemeStore,
    menu_topics: Vec<String>,
    fallback_topic: String,
    latest: AtomicU64,
    display: RwLock<Option<DisplayedArticle>>,
}

impl Reader {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        sanitizer: Sanitizer,
        related: RelatedTopics,
        themes: ThemeStore,
    ) -> Self {
        let defaults = ReaderConfig::default();
        Self {
            source,
            sanitizer,
            related,
            themes,
            menu_topics: defaults.menu_topics,
            fallback_topic: defaults.fallback_topic,
            latest: AtomicU64::new(0),
            display: RwLock::new(None),
        }
    }

    /// Wires the live encyclopedia client and the default sanitizer/resolver.
    pub fn from_config(config: &ReaderConfig) -> Result<Self> {
        let client = WikipediaClient::new(&config.fetch)?;
        let themes = match &config.theme_path {
            Some(path) => ThemeStore::persistent(path),
            None => ThemeStore::ephemeral(),
        };
        Ok(Self::new(
            Arc::new(client),
            Sanitizer::default(),
            RelatedTopics::curated(),
            themes,
        )
        .with_menu(config.menu_topics.clone())
        .with_fallback_topic(config.fallback_topic.clone()))
    }

    pub fn with_menu(mut self, topics: Vec<String>) -> Self {
        self.menu_topics = topics;
        self
    }

    pub fn with_fallback_topic(mut self, topic: impl Into<String>) -> Self {
        self.fallback_topic = topic.into();
        self
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn related(&self) -> &RelatedTopics {
        &self.related
    }

    pub fn menu_topics(&self) -> &[String] {
        &self.menu_topics
    }

    pub fn issue_token(&self) -> LoadToken {
        LoadToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest_token(&self) -> LoadToken {
        LoadToken(self.latest.load(Ordering::Acquire))
    }

    /// Runs the full pipeline for `topic` and swaps the result into the
    /// content region unless a newer load has been issued meanwhile.
    pub async fn load(&self, topic: impl Into<Topic>) -> Result<LoadOutcome> {
        let topic = topic.into();
        let token = self.issue_token();
        info!(%topic, token = token.value(), "loading article");
        let (kind, html) = self.render_topic(&topic).await?;
        Ok(self.apply(token, &topic, kind, html))
    }

    /// Fetches and lays out `topic` without touching the display.
    pub async fn article_view(&self, topic: &Topic) -> Result<ArticleView> {
        let article = self.source.fetch(topic).await?;
        let sanitized = self.sanitizer.sanitize(&article.content);
        let related = self.related.resolve(topic.as_str());
        Ok(ArticleView::build(topic, &article.summary, sanitized, related))
    }

    /// Content-region markup for `topic`; a missing article becomes the error layout.
    pub async fn render_topic(&self, topic: &Topic) -> Result<(LayoutKind, String)> {
        match self.article_view(topic).await {
            Ok(view) => {
                let html = view.render()?;
                Ok((view.kind(), html))
            }
            Err(ReaderError::NotFound { reason, .. }) => {
                info!(%topic, %reason, "article not found");
                let html = ErrorView::new(topic, reason, &self.fallback_topic).render()?;
                Ok((LayoutKind::NotFound, html))
            }
            Err(err) => Err(err),
        }
    }

    fn apply(&self, token: LoadToken, topic: &Topic, kind: LayoutKind, html: String) -> LoadOutcome {
        let article = DisplayedArticle {
            token,
            topic: topic.to_string(),
            kind,
            html,
        };
        let mut display = self.display.write();
        if token != self.latest_token() {
            debug!(%topic, token = token.value(), "discarding superseded load");
            return LoadOutcome::Superseded(article);
        }
        *display = Some(article.clone());
        LoadOutcome::Applied(article)
    }

    pub fn current(&self) -> Option<DisplayedArticle> {
        self.display.read().clone()
    }

    /// The page shell around whatever is displayed now.
    pub fn render_page(&self) -> Result<String> {
        let display = self.display.read();
        self.render_page_for(display.as_ref())
    }

    /// The page shell around `article`, independent of the shared display.
    pub fn render_page_for(&self, article: Option<&DisplayedArticle>) -> Result<String> {
        let current_topic = article.map(|article| article.topic.as_str());
        PageView {
            theme: self.themes.get(),
            menu: menu_items(&self.menu_topics, current_topic),
            current_topic,
            content_html: article.map(|article| article.html.as_str()),
        }
        .render()
    }
}
