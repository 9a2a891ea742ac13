// tests/dedup_similarity.rs
use chrono::{DateTime, Utc};
use tempfile::{tempdir, TempDir};

use fin_news_curator::dedup::store::{HistoryRecord, HistoryStore};
use fin_news_curator::dedup::{filter_duplicates, fingerprint};
use fin_news_curator::ingest::types::{ContentItem, ContentType};

fn item(title: &str, url: &str) -> ContentItem {
    ContentItem {
        title: title.to_string(),
        url: url.to_string(),
        source: "X".to_string(),
        description: String::new(),
        published_at: None,
        content_type: ContentType::News,
    }
}

fn store_with_title(title: &str, last_seen: DateTime<Utc>) -> (TempDir, HistoryStore) {
    let dir = tempdir().unwrap();
    let mut store = HistoryStore::open(dir.path().join("history.json"));
    let seed = item(title, "https://seed.test/0");
    store.upsert(
        fingerprint(&seed),
        HistoryRecord {
            title: seed.title,
            url: seed.url,
            source: seed.source,
            last_seen,
        },
    );
    (dir, store)
}

#[test]
fn near_identical_title_is_dropped_in_strict_mode() {
    let now = Utc::now();
    let (_dir, mut store) = store_with_title("Fed Raises Interest Rates Again", now);

    let batch = vec![item(
        "Fed Raises Interest Rate Again",
        "https://other.test/1",
    )];
    let (kept, stats) = filter_duplicates(&mut store, batch, true, 3, now);

    assert!(kept.is_empty());
    assert_eq!(stats.dropped_similar, 1);
}

#[test]
fn non_strict_mode_never_applies_similarity() {
    let now = Utc::now();
    let (_dir, mut store) = store_with_title("Fed Raises Interest Rates Again", now);

    let batch = vec![item(
        "Fed Raises Interest Rate Again",
        "https://other.test/1",
    )];
    let (kept, stats) = filter_duplicates(&mut store, batch, false, 3, now);

    assert_eq!(kept.len(), 1);
    assert_eq!(stats.dropped_similar, 0);
}

#[test]
fn threshold_is_exclusive_at_seventy_percent() {
    let now = Utc::now();
    // both titles have ten distinct tokens
    let seed = "fed cpi jobs housing market bonds stocks growth outlook data";

    // exactly 7/10 shared tokens: similarity == 0.7, passes
    let (_dir, mut store) = store_with_title(seed, now);
    let at_threshold = item(
        "fed cpi jobs housing market bonds stocks slump dollar yields",
        "https://other.test/1",
    );
    let (kept, stats) = filter_duplicates(&mut store, vec![at_threshold], true, 3, now);
    assert_eq!(kept.len(), 1, "exactly 0.7 must not be filtered");
    assert_eq!(stats.dropped_similar, 0);

    // 8/10 shared tokens: similarity == 0.8, dropped
    let (_dir, mut store) = store_with_title(seed, now);
    let above_threshold = item(
        "fed cpi jobs housing market bonds stocks growth dollar yields",
        "https://other.test/2",
    );
    let (kept, stats) = filter_duplicates(&mut store, vec![above_threshold], true, 3, now);
    assert!(kept.is_empty());
    assert_eq!(stats.dropped_similar, 1);
}

#[test]
fn similarity_only_scans_the_recency_window() {
    let now = Utc::now();
    let (_dir, mut store) =
        store_with_title("Fed Raises Interest Rates Again", now - chrono::Duration::days(5));

    let batch = vec![item(
        "Fed Raises Interest Rate Again",
        "https://other.test/1",
    )];
    let (kept, _) = filter_duplicates(&mut store, batch, true, 3, now);
    assert_eq!(kept.len(), 1, "out-of-window titles are not candidates");
}

#[test]
fn earlier_batch_survivors_are_candidates_for_later_items() {
    let dir = tempdir().unwrap();
    let mut store = HistoryStore::open(dir.path().join("history.json"));
    let now = Utc::now();

    let batch = vec![
        item("Fed Raises Interest Rates Again", "https://a.test/1"),
        item("Fed Raises Interest Rate Again", "https://b.test/2"),
    ];
    let (kept, stats) = filter_duplicates(&mut store, batch, true, 3, now);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "https://a.test/1");
    assert_eq!(stats.dropped_similar, 1);
}

#[test]
fn empty_titles_are_never_similar() {
    let now = Utc::now();
    let (_dir, mut store) = store_with_title("", now);

    let batch = vec![item("", "https://other.test/1")];
    let (kept, stats) = filter_duplicates(&mut store, batch, true, 3, now);

    // same empty title but a different url: not an exact match, and the
    // similarity rule skips empty token sets
    assert_eq!(kept.len(), 1);
    assert_eq!(stats.dropped_similar, 0);
}
