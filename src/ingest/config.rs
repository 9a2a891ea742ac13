// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "CURATOR_CONFIG_PATH";
const DEFAULT_TOML: &str = "config/curator.toml";
const DEFAULT_JSON: &str = "config/curator.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub search_queries: Vec<String>,
    /// Author-focused queries tagged as expert articles in the digest.
    pub expert_queries: Vec<String>,
    pub rss_feeds: Vec<String>,
    pub subreddits: Vec<String>,
    pub youtube_channels: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            search_queries: [
                "financial news for young professionals",
                "student loans 2025",
                "housing market trends",
                "credit card debt rising",
                "inflation personal finance",
                "PSLF student loan forgiveness",
                "income driven repayment",
                "student loan consolidation",
            ]
            .map(String::from)
            .to_vec(),
            expert_queries: Vec::new(),
            rss_feeds: [
                "https://feeds.bloomberg.com/markets/news.rss",
                "https://www.forbes.com/business/feed/",
                "https://www.cnbc.com/id/100003114/device/rss/rss.html",
                "https://feeds.marketwatch.com/marketwatch/topstories/",
            ]
            .map(String::from)
            .to_vec(),
            subreddits: ["pslf", "personalfinance", "studentloans"]
                .map(String::from)
                .to_vec(),
            youtube_channels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_articles_per_run: usize,
    pub max_reddit_posts: usize,
    pub max_youtube_videos: usize,
    pub rss_per_feed: usize,
    /// How many days back the news-search API looks.
    pub news_days_back: i64,
    /// Items rendered into one digest.
    pub digest_items: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_articles_per_run: 10,
            max_reddit_posts: 5,
            max_youtube_videos: 3,
            rss_per_feed: 5,
            news_days_back: 1,
            digest_items: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub window_days: i64,
    pub retention_days: i64,
    pub strict_mode: bool,
    /// Window for the recent-topics scan feeding the digest narrative.
    pub topics_days: i64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_days: crate::dedup::DEFAULT_WINDOW_DAYS,
            retention_days: 30,
            strict_mode: false,
            topics_days: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // Roughly five runs across a working day.
        Self {
            interval_secs: 3 * 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    pub name: String,
    pub voice: String,
    pub audience: String,
    /// Rendered into the digest footer when present.
    pub contact: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "FinBrief".to_string(),
            voice: "calm, trustworthy, educational, and empowering".to_string(),
            audience: "young professionals (20-40 years old)".to_string(),
            contact: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    pub sources: SourcesConfig,
    pub limits: LimitsConfig,
    pub dedup: DedupConfig,
    pub schedule: ScheduleConfig,
    pub brand: BrandConfig,
}

impl CuratorConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $CURATOR_CONFIG_PATH
    /// 2) config/curator.toml
    /// 3) config/curator.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("CURATOR_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from(DEFAULT_TOML);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<CuratorConfig> {
    let try_toml = hint_ext == "toml" || !s.trim_start().starts_with('{');
    if try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported config format"))
}
