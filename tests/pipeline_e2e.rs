// tests/pipeline_e2e.rs
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tempfile::tempdir;

use fin_news_curator::dedup::store::HistoryStore;
use fin_news_curator::ingest::config::CuratorConfig;
use fin_news_curator::ingest::types::{ContentItem, ContentType, SourceProvider};
use fin_news_curator::notify::DigestPublisher;
use fin_news_curator::pipeline::Curator;
use fin_news_curator::summarize::MockSummarizer;

struct StaticProvider {
    items: Vec<ContentItem>,
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &'static str {
        "static"
    }
}

struct FailingProvider;

#[async_trait]
impl SourceProvider for FailingProvider {
    async fn fetch_latest(&self) -> Result<Vec<ContentItem>> {
        anyhow::bail!("upstream api is down")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

#[derive(Clone, Default)]
struct CapturePublisher {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl DigestPublisher for CapturePublisher {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn item(title: &str, url: &str, ct: ContentType) -> ContentItem {
    ContentItem {
        title: title.to_string(),
        url: url.to_string(),
        source: "Example".to_string(),
        description: format!("About {title}"),
        published_at: Some(Utc::now()),
        content_type: ct,
    }
}

fn curator(
    providers: Vec<Box<dyn SourceProvider>>,
    publisher: CapturePublisher,
    store: HistoryStore,
) -> Curator {
    Curator::new(
        CuratorConfig::default(),
        providers,
        Box::new(MockSummarizer),
        Box::new(publisher),
        store,
    )
}

#[tokio::test]
async fn full_run_publishes_a_digest() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let publisher = CapturePublisher::default();

    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(StaticProvider {
            items: vec![
                item("Rates rise again", "https://a.test/1", ContentType::News),
                item("Loan questions pile up", "https://b.test/2", ContentType::RedditPost),
            ],
        }),
        Box::new(FailingProvider),
    ];

    let mut c = curator(providers, publisher.clone(), store);
    let report = c.run_once(Utc::now()).await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.unique, 2);
    assert!(report.published);
    assert!(report.persist_warning.is_none());

    let sent = publisher.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (subject, body) = &sent[0];
    assert!(subject.contains("Financial News Digest"));
    assert!(body.contains("[NEWS] Rates rise again"));
    assert!(body.contains("[REDDIT] Loan questions pile up"));
    assert!(body.contains("Summary of: Rates rise again"));
    assert!(body.contains("Perspective over 2 items."));
}

#[tokio::test]
async fn second_run_with_same_content_soft_stops() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let publisher = CapturePublisher::default();

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StaticProvider {
        items: vec![item("Rates rise again", "https://a.test/1", ContentType::News)],
    })];

    let mut c = curator(providers, publisher.clone(), store);
    let now = Utc::now();

    let first = c.run_once(now).await.unwrap();
    assert!(first.published);

    let second = c.run_once(now + Duration::hours(3)).await.unwrap();
    assert_eq!(second.fetched, 1);
    assert_eq!(second.unique, 0);
    assert_eq!(second.dropped_exact, 1);
    assert!(!second.published);

    assert_eq!(publisher.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_fetch_is_a_soft_stop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    let store = HistoryStore::open(&path);
    let publisher = CapturePublisher::default();

    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(StaticProvider { items: vec![] }), Box::new(FailingProvider)];

    let mut c = curator(providers, publisher.clone(), store);
    let report = c.run_once(Utc::now()).await.unwrap();

    assert_eq!(report.fetched, 0);
    assert!(!report.published);
    assert!(publisher.sent.lock().unwrap().is_empty());
    // the store was never touched, so no document exists
    assert!(!path.exists());
}

#[tokio::test]
async fn dedup_state_survives_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    let publisher = CapturePublisher::default();
    let items = vec![item("Rates rise again", "https://a.test/1", ContentType::News)];

    {
        let store = HistoryStore::open(&path);
        let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StaticProvider {
            items: items.clone(),
        })];
        let mut c = curator(providers, publisher.clone(), store);
        assert!(c.run_once(Utc::now()).await.unwrap().published);
    }

    // fresh curator over the persisted document
    let store = HistoryStore::open(&path);
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(StaticProvider { items })];
    let mut c = curator(providers, publisher.clone(), store);
    let report = c.run_once(Utc::now()).await.unwrap();

    assert_eq!(report.dropped_exact, 1);
    assert!(!report.published);
}
