use std::{collections::HashSet, future::Future, time::Duration};

use tokio::time::{interval, MissedTickBehavior};

use crate::{
    error::AppError,
    notify::AlertDetails,
    pipeline::{fuse, normalize, PipelineContext, TokenSnapshot},
};

/// Per-cycle tallies, logged once the batch is done
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub malformed: usize,
    pub already_processed: usize,
    pub deferred: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub alerted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenOutcome {
    AlreadyProcessed,
    Deferred,
    Skipped,
    Rejected,
    Alerted,
}

impl CycleReport {
    fn record(&mut self, outcome: TokenOutcome) {
        match outcome {
            TokenOutcome::AlreadyProcessed => self.already_processed += 1,
            TokenOutcome::Deferred => self.deferred += 1,
            TokenOutcome::Skipped => self.skipped += 1,
            TokenOutcome::Rejected => self.rejected += 1,
            TokenOutcome::Alerted => self.alerted += 1,
        }
    }
}

/// Run one polling cycle: fetch the feed and drive every new token to a decision.
///
/// Returns `Err` when the feed is unreachable or the ledger store fails; everything
/// else is isolated to the token it happened on.
pub async fn run_cycle(ctx: &PipelineContext) -> Result<CycleReport, AppError> {
    let raw_tokens = ctx.feed.fetch_tokens().await?;

    let mut report = CycleReport {
        fetched: raw_tokens.len(),
        ..CycleReport::default()
    };

    let mut seen = HashSet::new();
    let mut snapshots = Vec::with_capacity(raw_tokens.len());
    for raw in &raw_tokens {
        match normalize(raw) {
            Ok(snapshot) => {
                if seen.insert(snapshot.address.clone()) {
                    snapshots.push(snapshot);
                } else {
                    tracing::debug!(token = %snapshot.address, "Duplicate address in batch, ignored");
                }
            }
            Err(err) => {
                tracing::warn!("Dropping feed record: {err}");
                report.malformed += 1;
            }
        }
    }

    for snapshot in snapshots {
        let address = snapshot.address.clone();
        match process_token(ctx, snapshot).await {
            Ok(outcome) => report.record(outcome),
            Err(err) => {
                tracing::error!(token = %address, "Aborting cycle: {err}");
                return Err(err);
            }
        }
    }

    Ok(report)
}

/// Run a cycle every `poll_interval` until `shutdown` resolves.
///
/// Cycle errors are logged and retried on the next tick. A shutdown that fires while a
/// cycle is running stops the loop once that cycle returns.
pub async fn run_until<F: Future>(ctx: &PipelineContext, poll_interval: Duration, shutdown: F) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_cycle(ctx).await {
                    Ok(report) => tracing::info!(
                        fetched = report.fetched,
                        malformed = report.malformed,
                        already_processed = report.already_processed,
                        deferred = report.deferred,
                        skipped = report.skipped,
                        rejected = report.rejected,
                        alerted = report.alerted,
                        "Cycle complete"
                    ),
                    Err(err) => tracing::error!("Cycle failed, retrying next tick: {err}"),
                }
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Process one token. An `Err` means the rest of the cycle cannot safely continue.
async fn process_token(
    ctx: &PipelineContext,
    mut snapshot: TokenSnapshot,
) -> Result<TokenOutcome, AppError> {
    let address = snapshot.address.clone();

    match ctx.ledger.is_processed(&address).await {
        Ok(true) => {
            tracing::debug!(token = %address, "Already processed");
            return Ok(TokenOutcome::AlreadyProcessed);
        }
        Ok(false) => {}
        Err(err) if err.is_fatal_for_cycle() => return Err(err),
        Err(err) => {
            tracing::warn!(token = %address, "Ledger check failed, skipping: {err}");
            return Ok(TokenOutcome::Skipped);
        }
    }

    let diff = match ctx
        .history
        .record_and_diff(&address, &snapshot.market_cap)
        .await
    {
        Ok(diff) => diff,
        Err(err) => {
            tracing::error!(token = %address, "History unavailable, skipping: {err}");
            return Ok(TokenOutcome::Skipped);
        }
    };
    snapshot.mcap_delta = diff.delta;

    if ctx.defer_first_sighting && !diff.had_prior {
        tracing::info!(token = %address, symbol = %snapshot.symbol, "First sighting, deferred");
        return Ok(TokenOutcome::Deferred);
    }

    let raw_audit = match ctx.auditor.audit_token(&address).await {
        Ok(raw_audit) => raw_audit,
        Err(err) => {
            tracing::warn!(token = %address, "Audit failed, retrying next cycle: {err}");
            return Ok(TokenOutcome::Skipped);
        }
    };

    let evaluation = fuse(snapshot, &raw_audit);
    let decision = ctx.engine.evaluate(&evaluation);

    for check in &decision.checks {
        tracing::debug!(
            token = %address,
            rule = check.name,
            group = ?check.group,
            passed = check.passed,
            "{}",
            check.detail
        );
    }

    let outcome = if decision.eligible {
        let details = AlertDetails::from_context(&evaluation, ctx.engine.filters());
        tracing::info!(
            token = %address,
            symbol = %evaluation.snapshot.symbol,
            market_cap = %evaluation.snapshot.market_cap,
            "Token passed all filters, sending alert"
        );
        for notifier in &ctx.notifiers {
            if let Err(err) = notifier.send_alert(&evaluation.snapshot, &details).await {
                tracing::warn!(token = %address, channel = notifier.name(), "Alert delivery failed: {err}");
            }
        }
        TokenOutcome::Alerted
    } else {
        tracing::info!(
            token = %address,
            failed = decision.failed().count(),
            reason = decision.reason.as_deref().unwrap_or_default(),
            "Token rejected"
        );
        TokenOutcome::Rejected
    };

    match ctx.ledger.mark_processed(&address).await {
        Ok(()) => Ok(outcome),
        Err(AppError::DuplicateProcessing(token)) => {
            tracing::error!(token = %token, "Token finalized twice, marker kept");
            Ok(outcome)
        }
        Err(err) if err.is_fatal_for_cycle() => Err(err),
        Err(err) => {
            tracing::warn!(token = %address, "Could not finalize token: {err}");
            Ok(TokenOutcome::Skipped)
        }
    }
}
