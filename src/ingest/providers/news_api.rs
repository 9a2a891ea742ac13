// src/ingest/providers/news_api.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, ContentType, SourceProvider};

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct Resp {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: ArticleSource,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// News-search provider over the newsapi.org `everything` endpoint.
/// One request per configured query; expert-author queries are tagged
/// separately so the digest can call them out.
pub struct NewsApiProvider {
    http: reqwest::Client,
    api_key: String,
    queries: Vec<String>,
    expert_queries: Vec<String>,
    days_back: i64,
}

impl NewsApiProvider {
    pub fn new(
        api_key: Option<String>,
        queries: Vec<String>,
        expert_queries: Vec<String>,
        days_back: i64,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fin-news-curator/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.unwrap_or_default(),
            queries,
            expert_queries,
            days_back,
        }
    }

    async fn search(
        &self,
        query: &str,
        days_back: i64,
        content_type: ContentType,
    ) -> Result<Vec<ContentItem>> {
        let now = Utc::now();
        let from = (now - Duration::days(days_back)).format("%Y-%m-%d").to_string();
        let to = now.format("%Y-%m-%d").to_string();
        let resp: Resp = self
            .http
            .get(EVERYTHING_URL)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", "20"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut out = Vec::new();
        for a in resp.articles {
            // only articles with both a title and a description are usable
            let (Some(title), Some(description)) = (a.title, a.description) else {
                continue;
            };
            let title = normalize_text(&title);
            if title.is_empty() {
                continue;
            }
            out.push(ContentItem {
                title,
                url: a.url.unwrap_or_default(),
                source: a.source.name.unwrap_or_default(),
                description: normalize_text(&description),
                published_at: a
                    .published_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                content_type,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NewsApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        if self.api_key.is_empty() {
            tracing::warn!("NEWS_API_KEY not set, skipping news search");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for query in &self.queries {
            match self.search(query, self.days_back, ContentType::News).await {
                Ok(mut items) => out.append(&mut items),
                Err(e) => tracing::warn!(query = %query, error = %e, "news search failed"),
            }
        }
        // Expert authors get a wider net: a week instead of a day.
        for query in &self.expert_queries {
            match self.search(query, 7, ContentType::ExpertArticle).await {
                Ok(mut items) => out.append(&mut items),
                Err(e) => tracing::warn!(query = %query, error = %e, "expert search failed"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "news-api"
    }
}
