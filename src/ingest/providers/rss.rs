// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::normalize_text;
use crate::ingest::types::{ContentItem, ContentType, SourceProvider};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Pulls the configured RSS feeds and normalizes their entries. Can also be
/// fed raw XML directly, which keeps feed parsing testable offline.
pub struct RssProvider {
    http: reqwest::Client,
    feeds: Vec<String>,
    per_feed: usize,
    fixture: Option<String>,
}

impl RssProvider {
    pub fn new(feeds: Vec<String>, per_feed: usize) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fin-news-curator/0.1")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            http,
            feeds,
            per_feed,
            fixture: None,
        }
    }

    pub fn from_fixture(content: &str, per_feed: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            feeds: Vec::new(),
            per_feed,
            fixture: Some(content.to_string()),
        }
    }

    fn parse_feed(&self, xml: &str) -> Result<Vec<ContentItem>> {
        let t0 = std::time::Instant::now();

        let rss: Rss = from_str(xml).context("parsing rss xml")?;
        let source = rss
            .channel
            .title
            .as_deref()
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "RSS Feed".to_string());

        let mut out = Vec::new();
        for it in rss.channel.item.into_iter().take(self.per_feed) {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(ContentItem {
                title,
                url: it.link.unwrap_or_default(),
                source: source.clone(),
                description: normalize_text(it.description.as_deref().unwrap_or_default()),
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822),
                content_type: ContentType::Rss,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("curator_parse_ms").record(ms);

        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        if let Some(xml) = &self.fixture {
            return self.parse_feed(xml);
        }

        let mut out = Vec::new();
        for feed_url in &self.feeds {
            let body = match self.http.get(feed_url).send().await {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.text().await.unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!(feed = %feed_url, error = %e, "rss feed returned error status");
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(feed = %feed_url, error = %e, "rss feed unreachable");
                    continue;
                }
            };
            match self.parse_feed(&body) {
                Ok(mut items) => out.append(&mut items),
                Err(e) => tracing::warn!(feed = %feed_url, error = %e, "rss feed unparsable"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_dates_parse_to_utc() {
        let dt = parse_rfc2822("Tue, 20 May 2025 14:30:00 +0000").unwrap();
        assert_eq!(dt.timestamp(), 1_747_751_400);
        assert!(parse_rfc2822("not a date").is_none());
    }
}
