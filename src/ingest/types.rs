// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Where a content item came from, as rendered in the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    News,
    Rss,
    ExpertArticle,
    RedditPost,
    RedditDiscussion,
    YoutubeVideo,
    YoutubeSearch,
}

impl ContentType {
    /// Bracketed indicator used in the digest body.
    pub fn indicator(&self) -> &'static str {
        match self {
            ContentType::News => "[NEWS]",
            ContentType::Rss => "[ARTICLE]",
            ContentType::ExpertArticle => "[EXPERT]",
            ContentType::RedditPost => "[REDDIT]",
            ContentType::RedditDiscussion => "[DISCUSSION]",
            ContentType::YoutubeVideo => "[VIDEO]",
            ContentType::YoutubeSearch => "[YOUTUBE]",
        }
    }
}

/// Uniform shape every source adapter produces. Immutable once created;
/// absent upstream fields arrive as empty strings rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub url: String, // not guaranteed unique across sources
    pub source: String,
    #[serde(default)]
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub content_type: ContentType,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>>;
    fn name(&self) -> &'static str;
}
