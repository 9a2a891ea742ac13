// src/pipeline.rs
//! One curation run: fetch → deduplicate → summarize → publish.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::gauge;
use tracing::info;

use crate::dedup::store::HistoryStore;
use crate::dedup::{filter_duplicates, recent_topics};
use crate::digest::{digest_subject, render_digest, SummarizedItem};
use crate::ingest::config::CuratorConfig;
use crate::ingest::types::SourceProvider;
use crate::ingest::fetch_all;
use crate::notify::DigestPublisher;
use crate::summarize::Summarizer;

/// What one run did. `published == false` with an `Ok` result is a soft
/// stop: nothing new to say, so no digest went out.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub fetched: usize,
    pub unique: usize,
    pub dropped_exact: usize,
    pub dropped_similar: usize,
    pub published: bool,
    /// History bookkeeping failed to persist; dedup state may be stale on
    /// the next run.
    pub persist_warning: Option<String>,
}

pub struct Curator {
    config: CuratorConfig,
    providers: Vec<Box<dyn SourceProvider>>,
    summarizer: Box<dyn Summarizer>,
    publisher: Box<dyn DigestPublisher>,
    store: HistoryStore,
}

impl Curator {
    pub fn new(
        config: CuratorConfig,
        providers: Vec<Box<dyn SourceProvider>>,
        summarizer: Box<dyn Summarizer>,
        publisher: Box<dyn DigestPublisher>,
        store: HistoryStore,
    ) -> Self {
        Self {
            config,
            providers,
            summarizer,
            publisher,
            store,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    fn batch_cap(&self) -> usize {
        let limits = &self.config.limits;
        limits.max_articles_per_run
            + limits.max_reddit_posts * self.config.sources.subreddits.len()
            + limits.max_youtube_videos
    }

    /// Run the whole pipeline once. Publish failures are errors; an empty
    /// batch (before or after filtering) is a soft stop, not an error.
    pub async fn run_once(&mut self, now: DateTime<Utc>) -> Result<RunReport> {
        let mut report = RunReport::default();

        let items = fetch_all(&self.providers, self.batch_cap()).await;
        report.fetched = items.len();
        if items.is_empty() {
            info!("no content found, skipping digest");
            return Ok(report);
        }

        let dedup_cfg = &self.config.dedup;
        let (unique, stats) = filter_duplicates(
            &mut self.store,
            items,
            dedup_cfg.strict_mode,
            dedup_cfg.window_days,
            now,
        );
        report.unique = unique.len();
        report.dropped_exact = stats.dropped_exact;
        report.dropped_similar = stats.dropped_similar;
        report.persist_warning = stats.persist_error;

        // Bound store growth; scheduled here rather than inside the detector.
        self.store
            .prune_older_than(dedup_cfg.retention_days, now);

        if unique.is_empty() {
            info!("no unique content after filtering, skipping digest");
            return Ok(report);
        }

        let topics = recent_topics(&self.store, dedup_cfg.topics_days, now);

        let mut summarized = Vec::with_capacity(unique.len());
        for item in &unique {
            let summary = self.summarizer.summarize_item(item).await;
            summarized.push(SummarizedItem {
                item: item.clone(),
                summary,
            });
        }
        let perspective = self.summarizer.brand_perspective(&unique, &topics).await;

        let brand = &self.config.brand;
        let body = render_digest(
            brand,
            &summarized,
            &perspective,
            self.config.limits.digest_items,
            now,
        );
        let subject = digest_subject(brand, now);

        self.publisher
            .publish(&subject, &body)
            .await
            .context("publishing digest")?;
        report.published = true;

        gauge!("curator_last_run_ts").set(now.timestamp() as f64);
        info!(
            fetched = report.fetched,
            unique = report.unique,
            dropped_exact = report.dropped_exact,
            dropped_similar = report.dropped_similar,
            "digest published"
        );
        Ok(report)
    }
}
