//! Encyclopedia article reader.
//!
//! A topic goes through [`ArticleSource::fetch`] (summary, then full HTML),
//! the [`Sanitizer`], and an [`render::ArticleView`] layout before the
//! [`Reader`] swaps it into the displayed content region.

pub mod article;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod reader;
pub mod related;
pub mod render;
pub mod sanitize;
pub mod theme;

#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod test_utils;

pub use article::{Article, ArticleSummary, Topic};
pub use config::{FetchConfig, ReaderConfig};
pub use error::{ReaderError, Result};
pub use fetcher::{ArticleSource, WikipediaClient};
pub use reader::{DisplayedArticle, LoadOutcome, LoadToken, Reader};
pub use related::RelatedTopics;
pub use render::LayoutKind;
pub use sanitize::{Sanitizer, sanitize};
pub use theme::{Theme, ThemeStore};
