//! View-models and templates for the content region and the page shell.
//!
//! Layout selection happens while building an [`ArticleView`]; templates only
//! turn views into markup, and the [`crate::Reader`] decides what is displayed.

use askama::Template;
use serde::{Deserialize, Serialize};

use crate::article::{ArticleSummary, Topic, encode_component};
use crate::error::Result;
use crate::theme::Theme;

pub const SOURCE_LABEL: &str = "Wikipedia Encyclopedia";
pub const LANGUAGE_LABEL: &str = "English";
pub const DEFAULT_ARTICLE_TYPE: &str = "Article";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Summary plus the sanitized article body.
    Full,
    /// Degraded mode: the body could not be fetched.
    Summary,
    NotFound,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Full => "full",
            LayoutKind::Summary => "summary",
            LayoutKind::NotFound => "not-found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub topic: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Full { body_html: String },
    Summary { info: Vec<InfoRow> },
}

#[derive(Debug, Clone)]
pub struct ArticleView {
    pub topic: String,
    pub title: String,
    pub description: String,
    pub extract: String,
    pub thumbnail_url: Option<String>,
    pub page_url: String,
    pub updated: Option<String>,
    pub layout: Layout,
    pub related: Vec<RelatedLink>,
}

impl ArticleView {
    /// Chooses the full layout when `sanitized` has any markup, otherwise the
    /// summary-only fallback.
    pub fn build(
        topic: &Topic,
        summary: &ArticleSummary,
        sanitized: String,
        related: &[&str],
    ) -> Self {
        let layout = if sanitized.trim().is_empty() {
            Layout::Summary {
                info: summary_info(topic, summary),
            }
        } else {
            Layout::Full {
                body_html: sanitized,
            }
        };
        Self {
            topic: topic.to_string(),
            title: summary.title.clone(),
            description: summary.display_description().to_string(),
            extract: summary.extract.clone(),
            thumbnail_url: summary.thumbnail_url.clone(),
            page_url: summary.canonical_page_url.clone(),
            updated: summary.last_modified_date().map(str::to_string),
            layout,
            related: related_links(related),
        }
    }

    pub fn kind(&self) -> LayoutKind {
        match self.layout {
            Layout::Full { .. } => LayoutKind::Full,
            Layout::Summary { .. } => LayoutKind::Summary,
        }
    }

    pub fn render(&self) -> Result<String> {
        let (body_html, info) = match &self.layout {
            Layout::Full { body_html } => (Some(body_html.as_str()), &[][..]),
            Layout::Summary { info } => (None, info.as_slice()),
        };
        let template = ArticleTemplate {
            view: self,
            layout: self.kind().as_str(),
            body_html,
            info,
        };
        Ok(template.render()?)
    }
}

fn summary_info(topic: &Topic, summary: &ArticleSummary) -> Vec<InfoRow> {
    vec![
        InfoRow {
            label: "Topic",
            value: topic.to_string(),
        },
        InfoRow {
            label: "Type",
            value: summary
                .kind
                .clone()
                .filter(|kind| !kind.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ARTICLE_TYPE.to_string()),
        },
        InfoRow {
            label: "Content",
            value: SOURCE_LABEL.to_string(),
        },
        InfoRow {
            label: "Language",
            value: LANGUAGE_LABEL.to_string(),
        },
    ]
}

pub fn related_links(topics: &[&str]) -> Vec<RelatedLink> {
    topics
        .iter()
        .map(|topic| RelatedLink {
            topic: topic.to_string(),
            href: topic_href(topic),
        })
        .collect()
}

pub fn topic_href(topic: &str) -> String {
    format!("/?topic={}", encode_component(topic))
}

#[derive(Debug, Clone)]
pub struct ErrorView {
    pub topic: String,
    pub reason: String,
    pub fallback: RelatedLink,
}

impl ErrorView {
    pub fn new(topic: &Topic, reason: impl Into<String>, fallback_topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            reason: reason.into(),
            fallback: RelatedLink {
                topic: fallback_topic.to_string(),
                href: topic_href(fallback_topic),
            },
        }
    }

    pub fn render(&self) -> Result<String> {
        Ok(ErrorTemplate { view: self }.render()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub topic: String,
    pub href: String,
    pub active: bool,
}

pub fn menu_items(topics: &[String], active: Option<&str>) -> Vec<MenuItem> {
    topics
        .iter()
        .map(|topic| MenuItem {
            topic: topic.clone(),
            href: topic_href(topic),
            active: active == Some(topic.as_str()),
        })
        .collect()
}

/// The whole page: menu, theme switcher, loading indicator and content region.
pub struct PageView<'a> {
    pub theme: Theme,
    pub menu: Vec<MenuItem>,
    pub current_topic: Option<&'a str>,
    pub content_html: Option<&'a str>,
}

impl PageView<'_> {
    pub fn render(&self) -> Result<String> {
        let template = PageTemplate {
            theme: self.theme,
            switch_label: self.theme.switch_label(),
            menu: &self.menu,
            current_topic: self.current_topic.unwrap_or_default(),
            content_html: self.content_html,
            version: env!("CARGO_PKG_VERSION"),
        };
        Ok(template.render()?)
    }
}

#[derive(Template)]
#[template(
    source = r#"<article class="article" data-layout="{{ layout }}" data-topic="{{ view.topic }}">
  <div class="article-meta">
    <span class="article-source">📚 Source: Wikipedia</span>
    {% if let Some(updated) = view.updated %}
    <span class="article-date">Updated {{ updated }}</span>
    {% endif %}
    <a href="{{ view.page_url }}" target="_blank" rel="noopener" class="read-more">Read Full Article →</a>
  </div>
  {% if let Some(src) = view.thumbnail_url %}
  <img class="article-hero" src="{{ src }}" alt="{{ view.title }}">
  {% endif %}
  <h1 class="article-title">{{ view.title }}</h1>
  <p class="article-description">{{ view.description }}</p>
  {% if let Some(body) = body_html %}
  <section class="article-summary">
    <h2>Summary</h2>
    <p>{{ view.extract }}</p>
  </section>
  <div class="wikipedia-content">{{ body|safe }}</div>
  {% else %}
  <section class="article-summary comprehensive">
    <h2>Comprehensive Summary</h2>
    <p>{{ view.extract }}</p>
    <dl class="article-info">
      {% for row in info %}
      <div class="info-row"><dt>{{ row.label }}</dt><dd>{{ row.value }}</dd></div>
      {% endfor %}
    </dl>
  </section>
  {% endif %}
  <section class="related-topics">
    <h3>🔗 Related Topics</h3>
    <div class="related-list">
      {% for link in view.related %}
      <a class="related-topic" href="{{ link.href }}" data-topic="{{ link.topic }}">{{ link.topic }}</a>
      {% endfor %}
    </div>
  </section>
</article>"#,
    ext = "html"
)]
struct ArticleTemplate<'a> {
    view: &'a ArticleView,
    layout: &'static str,
    body_html: Option<&'a str>,
    info: &'a [InfoRow],
}

#[derive(Template)]
#[template(
    source = r#"<div class="article-error" data-layout="not-found" data-topic="{{ view.topic }}">
  <div class="error-icon">😕</div>
  <h2>Article Not Found</h2>
  <p class="error-message">We couldn't load “{{ view.topic }}”: {{ view.reason }}</p>
  <div class="error-actions">
    <button type="button" class="retry" onclick="window.location.reload()">Try Again</button>
    <a class="menu-shortcut related-topic" href="{{ view.fallback.href }}" data-topic="{{ view.fallback.topic }}">Read about {{ view.fallback.topic }}</a>
  </div>
</div>"#,
    ext = "html"
)]
struct ErrorTemplate<'a> {
    view: &'a ErrorView,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{ theme }}">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{% if current_topic.is_empty() %}Wiki Reader{% else %}{{ current_topic }} • Wiki Reader{% endif %}</title>
    <link rel="stylesheet" href="/static/reader.css">
  </head>
  <body>
    <aside class="sidebar">
      <p class="brand">📖 Wiki Reader <span class="version">v{{ version }}</span></p>
      <nav class="menu" aria-label="Topics">
        {% for item in menu %}
        <a class="menu-item{% if item.active %} active{% endif %}" href="{{ item.href }}" data-topic="{{ item.topic }}">{{ item.topic }}</a>
        {% endfor %}
      </nav>
      <form method="post" action="/theme/toggle" class="theme-form">
        <input type="hidden" name="topic" value="{{ current_topic }}">
        <button type="submit" id="theme-switcher">{{ switch_label }}</button>
      </form>
    </aside>
    <main class="content">
      <div id="loading" class="loading" aria-hidden="true"><span class="spinner"></span> Loading…</div>
      <div id="article-content">
        {% if let Some(content) = content_html %}
        {{ content|safe }}
        {% else %}
        <div class="welcome">
          <h1>Welcome</h1>
          <p>Pick a topic from the menu to read its encyclopedia article.</p>
        </div>
        {% endif %}
      </div>
    </main>
    <script src="/static/reader.js" defer></script>
  </body>
</html>"#,
    ext = "html"
)]
struct PageTemplate<'a> {
    theme: Theme,
    switch_label: &'static str,
    menu: &'a [MenuItem],
    current_topic: &'a str,
    content_html: Option<&'a str>,
    version: &'static str,
}
