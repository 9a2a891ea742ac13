// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{ContentItem, SourceProvider};

/// One-time metrics registration so series carry descriptions.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("curator_items_total", "Items parsed from source providers.");
        describe_counter!(
            "curator_kept_total",
            "Items kept after normalization + combining."
        );
        describe_counter!(
            "curator_dedup_exact_total",
            "Items dropped by the exact-fingerprint rule."
        );
        describe_counter!(
            "curator_dedup_similar_total",
            "Items dropped by the title-similarity rule."
        );
        describe_counter!(
            "curator_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("curator_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "curator_last_run_ts",
            "Unix ts when the curation pipeline last ran."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes and guillemets to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Combine provider batches: drop items with empty titles, keep the first
/// occurrence of each URL, sort by publish date (newest first, undated
/// last), and cap the batch size. Items past the cap are counted and logged.
pub fn combine_and_cap(batches: Vec<Vec<ContentItem>>, max_items: usize) -> Vec<ContentItem> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut combined: Vec<ContentItem> = Vec::new();

    for batch in batches {
        for item in batch {
            if item.title.is_empty() {
                continue;
            }
            if !item.url.is_empty() && !seen_urls.insert(item.url.clone()) {
                continue;
            }
            combined.push(item);
        }
    }

    combined.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    if combined.len() > max_items {
        tracing::debug!(
            dropped = combined.len() - max_items,
            max_items,
            "batch cap applied"
        );
        combined.truncate(max_items);
    }
    combined
}

/// Fetch from every provider, tolerating individual failures, and produce
/// one combined, capped batch. A failing provider contributes nothing.
pub async fn fetch_all(
    providers: &[Box<dyn SourceProvider>],
    max_items: usize,
) -> Vec<ContentItem> {
    ensure_metrics_described();

    let mut batches = Vec::with_capacity(providers.len());
    for p in providers {
        match p.fetch_latest().await {
            Ok(batch) => {
                tracing::info!(provider = p.name(), items = batch.len(), "fetched");
                counter!("curator_items_total").increment(batch.len() as u64);
                batches.push(batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("curator_provider_errors_total").increment(1);
            }
        }
    }

    let combined = combine_and_cap(batches, max_items);
    counter!("curator_kept_total").increment(combined.len() as u64);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::ContentType;
    use chrono::{TimeZone, Utc};

    fn item(title: &str, url: &str, ts: Option<i64>) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            url: url.to_string(),
            source: "Test".to_string(),
            description: String::new(),
            published_at: ts.map(|t| Utc.timestamp_opt(t, 0).unwrap()),
            content_type: ContentType::News,
        }
    }

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "  <b>Hello&nbsp;&nbsp;world</b> &ldquo;ok&rdquo;  ";
        assert_eq!(normalize_text(s), r#"Hello world "ok""#);
    }

    #[test]
    fn combine_dedups_urls_keeping_first() {
        let a = vec![item("one", "https://x.test/1", Some(100))];
        let b = vec![
            item("one again", "https://x.test/1", Some(200)),
            item("two", "https://x.test/2", Some(50)),
        ];
        let out = combine_and_cap(vec![a, b], 10);
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|i| i.title == "one"));
        assert!(!out.iter().any(|i| i.title == "one again"));
    }

    #[test]
    fn combine_sorts_newest_first_and_caps() {
        let batch = vec![
            item("old", "https://x.test/1", Some(100)),
            item("new", "https://x.test/2", Some(300)),
            item("mid", "https://x.test/3", Some(200)),
            item("undated", "https://x.test/4", None),
        ];
        let out = combine_and_cap(vec![batch], 3);
        let titles: Vec<_> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn combine_drops_empty_titles() {
        let batch = vec![item("", "https://x.test/1", None), item("ok", "", None)];
        let out = combine_and_cap(vec![batch], 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "ok");
    }
}
