// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, ContentType, SourceProvider};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Post {
    title: String,
    selftext: String,
    permalink: String,
    stickied: bool,
    is_self: bool,
    score: i64,
    created_utc: f64,
}

/// Trending self-posts from the configured subreddits, via the public JSON
/// listing endpoint. No OAuth; a descriptive User-Agent is required.
pub struct RedditProvider {
    http: reqwest::Client,
    subreddits: Vec<String>,
    per_subreddit: usize,
}

impl RedditProvider {
    pub fn new(subreddits: Vec<String>, per_subreddit: usize) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fin-news-curator/0.1 (financial news digest bot)")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            http,
            subreddits,
            per_subreddit,
        }
    }

    async fn hot_posts(&self, subreddit: &str) -> Result<Vec<(i64, ContentItem)>> {
        let url = format!(
            "https://www.reddit.com/r/{subreddit}/hot.json?limit={}&raw_json=1",
            self.per_subreddit * 2
        );
        let listing: Listing = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching r/{subreddit}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding r/{subreddit} listing"))?;

        let mut posts = Vec::new();
        for child in listing.data.children {
            let p = child.data;
            // stickied mod posts and link posts carry little discussion value
            if p.stickied || !p.is_self {
                continue;
            }
            let title = normalize_text(&p.title);
            if title.is_empty() {
                continue;
            }
            let description: String = p.selftext.chars().take(500).collect();
            posts.push((
                p.score,
                ContentItem {
                    title,
                    url: format!("https://reddit.com{}", p.permalink),
                    source: format!("r/{subreddit}"),
                    description: normalize_text(&description),
                    published_at: Utc.timestamp_opt(p.created_utc as i64, 0).single(),
                    content_type: ContentType::RedditPost,
                },
            ));
            if posts.len() >= self.per_subreddit {
                break;
            }
        }
        Ok(posts)
    }
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        let mut scored = Vec::new();
        for sub in &self.subreddits {
            match self.hot_posts(sub).await {
                Ok(mut posts) => scored.append(&mut posts),
                Err(e) => tracing::warn!(subreddit = %sub, error = %e, "reddit fetch failed"),
            }
        }
        // most upvoted first across all subreddits
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(self.per_subreddit * self.subreddits.len().max(1));
        Ok(scored.into_iter().map(|(_, item)| item).collect())
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
