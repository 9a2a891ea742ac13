// src/dedup/mod.rs
pub mod store;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::debug;

use crate::ingest::types::ContentItem;
use store::{is_within_window, HistoryRecord, HistoryStore};

/// Similarity above this ratio disqualifies an item in strict mode.
/// The threshold is exclusive: exactly 0.7 passes.
const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Default recency window for duplicate checks, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 3;

/// Fixed vocabulary scanned by `recent_topics`.
const FINANCIAL_TERMS: &[&str] = &[
    "student loan",
    "pslf",
    "forgiveness",
    "inflation",
    "housing",
    "credit",
    "debt",
    "investment",
    "budget",
    "retirement",
    "tax",
    "mortgage",
    "refinance",
];

/// Per-batch outcome of `filter_duplicates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub kept: usize,
    pub dropped_exact: usize,
    pub dropped_similar: usize,
    /// Set when persisting the updated history failed; the in-memory store
    /// is still current, so the run continues.
    pub persist_error: Option<String>,
}

/// Deterministic identity digest over title + url + source.
pub fn fingerprint(item: &ContentItem) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(item.title.as_bytes());
    hasher.update(item.url.as_bytes());
    hasher.update(item.source.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn title_tokens(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Token-overlap ratio: |intersection| / min(|a|, |b|).
/// An empty token set on either side never matches.
fn title_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let overlap = a.intersection(b).count();
    overlap as f64 / a.len().min(b.len()) as f64
}

fn has_similar_title(
    store: &HistoryStore,
    tokens: &HashSet<String>,
    window_days: i64,
    now: DateTime<Utc>,
) -> bool {
    store
        .recent(window_days, now)
        .any(|(_, rec)| title_similarity(tokens, &title_tokens(&rec.title)) > SIMILARITY_THRESHOLD)
}

fn truncate_title(title: &str) -> String {
    title.chars().take(50).collect()
}

/// Drop items already seen inside the recency window and record survivors.
///
/// Exact matches are dropped when the fingerprint's `last_seen` is inside
/// `window_days`; a fingerprint last seen outside the window passes and has
/// its timestamp refreshed, so the store behaves as a sliding-window cache
/// rather than a permanent blocklist. With `strict_mode`, items whose title
/// token-overlaps an in-window record above the threshold are also dropped.
/// Records written for earlier survivors are visible to later items of the
/// same batch. Survivors keep their input order.
///
/// The mutated store is flushed once per non-empty batch; a flush failure is
/// reported through `DedupStats::persist_error`, never raised.
pub fn filter_duplicates(
    store: &mut HistoryStore,
    items: Vec<ContentItem>,
    strict_mode: bool,
    window_days: i64,
    now: DateTime<Utc>,
) -> (Vec<ContentItem>, DedupStats) {
    let mut stats = DedupStats::default();
    if items.is_empty() {
        return (Vec::new(), stats);
    }

    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        let fp = fingerprint(&item);

        let recent_hit = store
            .get(&fp)
            .is_some_and(|rec| is_within_window(rec.last_seen, window_days, now));
        if recent_hit {
            debug!(title = %truncate_title(&item.title), rule = "exact", "filtered duplicate");
            counter!("curator_dedup_exact_total").increment(1);
            stats.dropped_exact += 1;
            continue;
        }

        if strict_mode {
            let tokens = title_tokens(&item.title);
            if has_similar_title(store, &tokens, window_days, now) {
                debug!(title = %truncate_title(&item.title), rule = "similarity", "filtered duplicate");
                counter!("curator_dedup_similar_total").increment(1);
                stats.dropped_similar += 1;
                continue;
            }
        }

        store.upsert(
            fp,
            HistoryRecord {
                title: item.title.clone(),
                url: item.url.clone(),
                source: item.source.clone(),
                last_seen: now,
            },
        );
        kept.push(item);
    }

    stats.kept = kept.len();
    if let Err(e) = store.flush() {
        tracing::warn!(error = %e, "failed to persist content history");
        stats.persist_error = Some(format!("{e:#}"));
    }
    (kept, stats)
}

/// Which vocabulary terms appear in any in-window title. Read-only; used to
/// steer the digest narrative toward recently covered ground.
pub fn recent_topics(store: &HistoryStore, days: i64, now: DateTime<Utc>) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for (_, rec) in store.recent(days, now) {
        let title = rec.title.to_lowercase();
        for term in FINANCIAL_TERMS {
            if title.contains(term) && !topics.iter().any(|t| t == term) {
                topics.push((*term).to_string());
            }
        }
    }
    topics
}
