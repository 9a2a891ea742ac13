// src/ingest/providers/youtube.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, ContentType, SourceProvider};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

#[derive(Debug, Deserialize)]
struct Resp {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: Id,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Id {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
}

/// Latest uploads from the configured channels, via the Data API v3 search
/// endpoint.
pub struct YoutubeProvider {
    http: reqwest::Client,
    api_key: String,
    channels: Vec<String>,
    max_videos: usize,
}

impl YoutubeProvider {
    pub fn new(api_key: Option<String>, channels: Vec<String>, max_videos: usize) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fin-news-curator/0.1")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.unwrap_or_default(),
            channels,
            max_videos,
        }
    }

    async fn channel_uploads(&self, channel_id: &str) -> Result<Vec<ContentItem>> {
        let resp: Resp = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("key", self.api_key.as_str()),
                ("channelId", channel_id),
                ("part", "snippet"),
                ("order", "date"),
                ("type", "video"),
                ("maxResults", "5"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut out = Vec::new();
        for it in resp.items {
            let Some(video_id) = it.id.video_id else {
                continue;
            };
            let title = normalize_text(it.snippet.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(ContentItem {
                title,
                url: format!("https://www.youtube.com/watch?v={video_id}"),
                source: it.snippet.channel_title.unwrap_or_default(),
                description: normalize_text(it.snippet.description.as_deref().unwrap_or_default()),
                published_at: it
                    .snippet
                    .published_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                content_type: ContentType::YoutubeVideo,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for YoutubeProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        if self.api_key.is_empty() {
            tracing::warn!("YOUTUBE_API_KEY not set, skipping video search");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for channel in &self.channels {
            match self.channel_uploads(channel).await {
                Ok(mut items) => out.append(&mut items),
                Err(e) => tracing::warn!(channel = %channel, error = %e, "youtube fetch failed"),
            }
        }
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        out.truncate(self.max_videos);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
