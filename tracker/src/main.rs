//! Launch Tracker
//!
//! Polls a token feed on a fixed interval, audits new launches, and alerts on the ones
//! that pass every filter.

use std::error::Error;

use reqwest::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clients::{DexScreenerFeed, SolscanAuditor};
use config::TrackerConfig;
use notify::{Notifier, RedisPublisher, TelegramNotifier};
use pipeline::{PgDedupLedger, PgHistoryTracker, PipelineContext};
use scoring::EligibilityEngine;
use service::run_until;

mod clients;
mod config;
mod error;
mod notify;
mod pipeline;
mod scoring;
mod service;
mod utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info,tracker_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Launch Tracker...");

    let config = TrackerConfig::from_env()?;

    let db_pool = tracker_db::initialize_database().await?;
    tracker_db::run_migrations(&db_pool).await?;

    let http = Client::builder().timeout(config.http_timeout).build()?;

    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(telegram) = config.telegram.clone() {
        notifiers.push(Box::new(TelegramNotifier::new(http.clone(), telegram)));
    }
    if let Some(redis_url) = &config.redis_url {
        match RedisPublisher::new(redis_url).await {
            Ok(publisher) => notifiers.push(Box::new(publisher)),
            Err(err) => tracing::warn!("Redis alerts disabled: {err}"),
        }
    }
    if notifiers.is_empty() {
        tracing::warn!("No alert channel configured, decisions will only be logged");
    }

    let ctx = PipelineContext {
        feed: Box::new(DexScreenerFeed::new(http.clone(), config.feed_url.clone())),
        auditor: Box::new(SolscanAuditor::new(
            http,
            config.solscan_api_url.clone(),
            config.solscan_api_key.clone(),
        )),
        notifiers,
        ledger: Box::new(PgDedupLedger::new(db_pool.clone())),
        history: Box::new(PgHistoryTracker::new(db_pool.clone())),
        engine: EligibilityEngine::new(config.filters.clone()),
        defer_first_sighting: config.defer_first_sighting,
    };

    tracing::info!(
        "Tracker started. Polling every {} seconds...",
        config.poll_interval.as_secs()
    );

    run_until(&ctx, config.poll_interval, tokio::signal::ctrl_c()).await;
    tracing::info!("Shutdown signal received");

    db_pool.close().await;
    tracing::info!("Tracker stopped");

    Ok(())
}
