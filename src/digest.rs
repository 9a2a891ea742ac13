// src/digest.rs
//! Plain-text digest rendering. Layout only; the voice lives in the
//! summaries themselves.

use chrono::{DateTime, Utc};

use crate::ingest::config::BrandConfig;
use crate::ingest::types::ContentItem;

const RULE: &str = "===============================================";

#[derive(Debug, Clone)]
pub struct SummarizedItem {
    pub item: ContentItem,
    pub summary: String,
}

pub fn digest_subject(brand: &BrandConfig, now: DateTime<Utc>) -> String {
    format!(
        "{} Financial News Digest - {}",
        brand.name,
        now.format("%B %d, %Y")
    )
}

/// File name for the archived copy of a digest.
pub fn digest_filename(brand: &BrandConfig, now: DateTime<Utc>) -> String {
    format!(
        "{}_digest_{}.md",
        brand.name.to_lowercase(),
        now.format("%Y%m%d_%H%M")
    )
}

pub fn render_digest(
    brand: &BrandConfig,
    items: &[SummarizedItem],
    perspective: &str,
    max_items: usize,
    now: DateTime<Utc>,
) -> String {
    let mut digest = format!(
        "Date: {}\nCompiled automatically at {}\n\n{RULE}\n\nTOP FINANCIAL STORIES\n{RULE}\n\n",
        now.format("%B %d, %Y"),
        now.format("%I:%M %p UTC"),
    );

    for (i, entry) in items.iter().take(max_items).enumerate() {
        let item = &entry.item;
        let title = if item.title.is_empty() {
            "No Title"
        } else {
            item.title.as_str()
        };
        let source = if item.source.is_empty() {
            "Unknown Source"
        } else {
            item.source.as_str()
        };
        let url = if item.url.is_empty() {
            "#"
        } else {
            item.url.as_str()
        };

        digest.push_str(&format!(
            "{}. {} {}\n   Source: {}\n   Link: {}\n\n   Summary: {}\n\n   {}\n\n",
            i + 1,
            item.content_type.indicator(),
            title,
            source,
            url,
            entry.summary,
            "-".repeat(60),
        ));
    }

    digest.push_str(&format!(
        "\n{RULE}\n\n{} PERSPECTIVE\n{RULE}\n\n{}\n\n{RULE}\n\n\
         This digest was automatically compiled by the {} news curator.\n",
        brand.name.to_uppercase(),
        perspective,
        brand.name,
    ));
    if let Some(contact) = &brand.contact {
        digest.push_str(&format!("For questions or feedback, contact {contact}\n"));
    }

    digest
}
