use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::article::{Article, ArticleSummary, SummaryPayload, Topic};
use crate::config::FetchConfig;
use crate::error::{ReaderError, Result};

/// Source of articles for the render pipeline.
///
/// A failed summary is `ReaderError::NotFound`; a failed content request is
/// not an error and yields an `Article` with empty `content`.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, topic: &Topic) -> Result<Article>;
}

/// REST client for the public encyclopedia API.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: Client,
    api_base: String,
}

impl WikipediaClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn summary_url(&self, topic: &Topic) -> String {
        format!("{}/api/rest_v1/page/summary/{}", self.api_base, topic.encoded())
    }

    pub fn content_url(&self, topic: &Topic) -> String {
        format!("{}/api/rest_v1/page/html/{}", self.api_base, topic.encoded())
    }

    fn page_url(&self, topic: &Topic) -> String {
        format!("{}/wiki/{}", self.api_base, topic.encoded())
    }

    async fn fetch_summary(&self, topic: &Topic) -> Result<ArticleSummary> {
        let url = self.summary_url(topic);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ReaderError::not_found(topic.as_str(), err))?;
        let status = response.status();
        if !status.is_success() {
            debug!(%topic, %status, "summary request rejected");
            return Err(ReaderError::not_found(
                topic.as_str(),
                format!("Article not found (HTTP {status})"),
            ));
        }
        let payload: SummaryPayload = response
            .json()
            .await
            .map_err(|err| ReaderError::not_found(topic.as_str(), err))?;
        Ok(ArticleSummary::from_payload(payload, self.page_url(topic)))
    }

    /// Any failure here degrades to an empty body.
    async fn fetch_content(&self, topic: &Topic) -> String {
        let url = self.content_url(topic);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%topic, error = %err, "content request failed; using summary layout");
                return String::new();
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!(%topic, %status, "content request rejected; using summary layout");
            return String::new();
        }
        match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(%topic, error = %err, "failed to read content body");
                String::new()
            }
        }
    }
}

#[async_trait]
impl ArticleSource for WikipediaClient {
    async fn fetch(&self, topic: &Topic) -> Result<Article> {
        let summary = self.fetch_summary(topic).await?;
        let content = self.fetch_content(topic).await;
        debug!(%topic, bytes = content.len(), "article fetched");
        Ok(Article { summary, content })
    }
}
