//! Financial News Curator — Binary Entrypoint
//!
//! Runs the full pipeline (fetch → deduplicate → summarize → email) once,
//! or on a recurring schedule. Credentials come from the environment; see
//! `config/curator.toml` for everything else.

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fin_news_curator::dedup::store::{HistoryStore, DEFAULT_STORE_PATH};
use fin_news_curator::ingest::config::CuratorConfig;
use fin_news_curator::ingest::providers::{
    news_api::NewsApiProvider, reddit::RedditProvider, rss::RssProvider,
    youtube::YoutubeProvider,
};
use fin_news_curator::ingest::types::SourceProvider;
use fin_news_curator::notify::EmailSender;
use fin_news_curator::pipeline::Curator;
use fin_news_curator::scheduler::run_on_interval;
use fin_news_curator::summarize::OpenAiSummarizer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Publishing cannot degrade gracefully; everything else can.
fn check_environment() -> bool {
    let required = [
        "SMTP_HOST",
        "SMTP_USER",
        "SMTP_PASS",
        "DIGEST_EMAIL_FROM",
        "DIGEST_EMAIL_TO",
    ];
    let mut ok = true;
    for var in required {
        if std::env::var(var).is_err() {
            error!(var, "required environment variable missing");
            ok = false;
        }
    }
    for var in ["OPENAI_API_KEY", "NEWS_API_KEY", "YOUTUBE_API_KEY"] {
        if std::env::var(var).is_err() {
            warn!(var, "not set; the matching feature degrades to a fallback");
        }
    }
    ok
}

fn build_providers(config: &CuratorConfig) -> Vec<Box<dyn SourceProvider>> {
    let sources = &config.sources;
    let limits = &config.limits;
    vec![
        Box::new(NewsApiProvider::new(
            std::env::var("NEWS_API_KEY").ok(),
            sources.search_queries.clone(),
            sources.expert_queries.clone(),
            limits.news_days_back,
        )),
        Box::new(RssProvider::new(
            sources.rss_feeds.clone(),
            limits.rss_per_feed,
        )),
        Box::new(RedditProvider::new(
            sources.subreddits.clone(),
            limits.max_reddit_posts,
        )),
        Box::new(YoutubeProvider::new(
            std::env::var("YOUTUBE_API_KEY").ok(),
            sources.youtube_channels.clone(),
            limits.max_youtube_videos,
        )),
    ]
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    if !check_environment() {
        return ExitCode::FAILURE;
    }

    let config = match CuratorConfig::load_default() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let publisher = match EmailSender::from_env() {
        Ok(p) => p,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to build email sender");
            return ExitCode::FAILURE;
        }
    };

    let store_path =
        std::env::var("CURATOR_HISTORY_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    let store = HistoryStore::open(&store_path);
    info!(path = %store_path, records = store.len(), "content history loaded");

    let summarizer = OpenAiSummarizer::new(
        std::env::var("OPENAI_API_KEY").ok(),
        config.brand.clone(),
        None,
    );
    let providers = build_providers(&config);
    let interval_secs = config.schedule.interval_secs;

    let mut curator = Curator::new(
        config,
        providers,
        Box::new(summarizer),
        Box::new(publisher),
        store,
    );

    let mode = std::env::args().nth(1).unwrap_or_else(|| "once".to_string());
    match mode.as_str() {
        "once" => match curator.run_once(chrono::Utc::now()).await {
            Ok(report) if report.published => {
                info!(unique = report.unique, "curation run completed");
                ExitCode::SUCCESS
            }
            Ok(_) => {
                info!("curation run finished with nothing to publish");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "curation run failed");
                ExitCode::FAILURE
            }
        },
        "schedule" => {
            info!(interval_secs, "starting curation scheduler");
            run_on_interval(curator, interval_secs).await;
            ExitCode::SUCCESS
        }
        other => {
            error!(mode = other, "unknown mode; use `once` or `schedule`");
            ExitCode::FAILURE
        }
    }
}
