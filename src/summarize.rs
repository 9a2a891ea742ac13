// src/summarize.rs
//! Brand-voice summarization over the OpenAI Chat Completions API.
//!
//! The rest of the pipeline only sees the `Summarizer` trait; the API is an
//! opaque oracle that either returns text or falls back to a deterministic
//! sentence, so a failed call can never sink a run.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ingest::config::BrandConfig;
use crate::ingest::types::ContentItem;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const GUIDELINES_PATH: &str = "config/brand_guidelines.md";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short (2-3 sentence) summary of one item in the brand voice.
    async fn summarize_item(&self, item: &ContentItem) -> String;

    /// One aggregate narrative over the whole batch. `recent_topics` names
    /// vocabulary terms covered in recent digests so the narrative can
    /// acknowledge ongoing threads.
    async fn brand_perspective(&self, items: &[ContentItem], recent_topics: &[String]) -> String;
}

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    brand: BrandConfig,
    guidelines: String,
}

impl OpenAiSummarizer {
    /// `model_override`: defaults to gpt-4o-mini.
    pub fn new(api_key: Option<String>, brand: BrandConfig, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fin-news-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        let guidelines = load_guidelines(Path::new(GUIDELINES_PATH), &brand);
        Self {
            http,
            api_key: api_key.unwrap_or_default(),
            model: model_override.unwrap_or("gpt-4o-mini").to_string(),
            brand,
            guidelines,
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        let resp = self
            .http
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "summarization call rejected");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            None
        } else {
            Some(content)
        }
    }
}

fn load_guidelines(path: &Path, brand: &BrandConfig) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => format!("Use {}'s voice: {}.", brand.name, brand.voice),
    }
}

/// Coarse theme buckets for the narrative prompt.
fn themes(items: &[ContentItem]) -> Vec<&'static str> {
    let mut found = Vec::new();
    for item in items {
        let text = format!(
            "{} {}",
            item.title.to_lowercase(),
            item.description.to_lowercase()
        );
        let theme = if ["student loan", "pslf", "forgiveness"]
            .iter()
            .any(|k| text.contains(k))
        {
            "student loans"
        } else if ["inflation", "cost", "price"].iter().any(|k| text.contains(k)) {
            "inflation"
        } else if ["housing", "home", "mortgage"].iter().any(|k| text.contains(k)) {
            "housing"
        } else if ["credit", "debt", "payment"].iter().any(|k| text.contains(k)) {
            "credit and debt"
        } else {
            continue;
        };
        if !found.contains(&theme) {
            found.push(theme);
        }
    }
    found
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize_item(&self, item: &ContentItem) -> String {
        let content_text = format!(
            "Title: {}\nDescription: {}\nSource: {}\nURL: {}\n",
            item.title, item.description, item.source, item.url
        );
        let system = format!(
            "You are {}'s financial content summarizer. Always use this voice: {}.",
            self.brand.name, self.brand.voice
        );
        let user = format!(
            "Follow the brand voice guidelines below:\n\n{}\n\n\
             Summarize the following financial content in 2-3 sentences for {}.\n\
             Focus on what this means for their personal finances and why it matters.\n\
             Always end with either a lesson, next step, or feeling of progress.\n\n\
             Content to summarize:\n{}",
            self.guidelines, self.brand.audience, content_text
        );

        match self.chat(&system, &user, 200, 0.6).await {
            Some(summary) => summary,
            None => format!(
                "Important financial update from {}: {}",
                if item.source.is_empty() {
                    "Unknown"
                } else {
                    item.source.as_str()
                },
                if item.title.is_empty() {
                    "No title available"
                } else {
                    item.title.as_str()
                }
            ),
        }
    }

    async fn brand_perspective(&self, items: &[ContentItem], recent_topics: &[String]) -> String {
        let themes = themes(items);
        let themes_text = if themes.is_empty() {
            "general financial topics".to_string()
        } else {
            themes.join(", ")
        };

        let system = format!(
            "You are {}'s financial perspective writer. Always use this voice: {}.",
            self.brand.name, self.brand.voice
        );
        let mut user = format!(
            "Follow the brand voice guidelines:\n\n{}\n\n\
             Write a 3-5 sentence summary of today's financial landscape for {}.\n\
             The main themes today are: {themes_text}\n",
            self.guidelines, self.brand.audience
        );
        if !recent_topics.is_empty() {
            user.push_str(&format!(
                "Topics already covered in recent digests (avoid repeating them verbatim): {}\n",
                recent_topics.join(", ")
            ));
        }
        user.push_str(
            "Acknowledge any concerns but provide reassurance and direction.\n\
             End with a sense of progress or next steps.\n",
        );

        match self.chat(&system, &user, 300, 0.7).await {
            Some(text) => text,
            None => "Today's financial landscape continues to evolve, and staying informed \
                     helps you make confident decisions about your money. Remember, you're \
                     not alone in navigating these changes - thousands of professionals like \
                     you are building their financial future one step at a time."
                .to_string(),
        }
    }
}

/// Deterministic summarizer for tests and dry runs.
pub struct MockSummarizer;

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize_item(&self, item: &ContentItem) -> String {
        format!("Summary of: {}", item.title)
    }

    async fn brand_perspective(&self, items: &[ContentItem], _recent_topics: &[String]) -> String {
        format!("Perspective over {} items.", items.len())
    }
}
