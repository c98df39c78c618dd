use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::auth::{CredentialResolver, TokenAcquirer};
use crate::config::{AppConfig, SmtpConfig};
use crate::models::DealResult;
use crate::notifiers::{EmailNotifier, NotificationReceipt, Notifier};
use crate::querier::{DealQuery, SourceQuerier};
use crate::secrets::SecretStore;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// The run found nothing, so no notification was attempted.
    NotNeeded,
    Sent(NotificationReceipt),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub deals_found: usize,
    pub queries_attempted: usize,
    pub queries_failed: usize,
    pub notification: NotificationStatus,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    Completed(RunReport),
    /// Another run still held the guard when this tick fired.
    Skipped,
}

/// Runs the deal search once per tick and emails what it finds. Ticks never
/// overlap: a tick that fires during a run is skipped.
pub struct DealBot {
    config: Arc<AppConfig>,
    aggregator: Aggregator,
    notifier: Arc<dyn Notifier>,
    run_guard: Mutex<()>,
}

impl DealBot {
    pub fn new(
        config: Arc<AppConfig>,
        query: Arc<dyn DealQuery>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(query),
            notifier,
            run_guard: Mutex::new(()),
        }
    }

    /// Wire up the HTTP querier, credential resolver and email notifier.
    pub fn from_config(
        config: Arc<AppConfig>,
        secrets: Arc<dyn SecretStore>,
        smtp: SmtpConfig,
    ) -> Result<Self> {
        let client = SourceQuerier::build_client(&config.http)?;
        let credentials =
            CredentialResolver::with_defaults(secrets, TokenAcquirer::new(client.clone()));
        let querier = SourceQuerier::new(client, credentials);

        Ok(Self::new(
            config,
            Arc::new(querier),
            Arc::new(EmailNotifier::new(smtp)),
        ))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn tick(&self) -> TickOutcome {
        let Ok(_guard) = self.run_guard.try_lock() else {
            tracing::warn!("Previous run still in progress, skipping this tick");
            metrics::counter!("dealbot_runs_skipped_total").increment(1);
            return TickOutcome::Skipped;
        };

        TickOutcome::Completed(self.run().await)
    }

    async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!("🔎 Running deal scraper... (run {})", run_id);
        metrics::counter!("dealbot_runs_total").increment(1);

        let result = self
            .aggregator
            .run(&self.config.api_sources, &self.config.search_terms)
            .await;

        let notification = if result.is_empty() {
            tracing::info!("ℹ️ No new deals found.");
            NotificationStatus::NotNeeded
        } else {
            tracing::info!("✅ Found {} new deals", result.len());
            metrics::counter!("dealbot_deals_found_total").increment(result.len() as u64);
            self.send_notification(&result.deals).await
        };

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            deals_found: result.len(),
            queries_attempted: result.queries_attempted,
            queries_failed: result.queries_failed,
            notification,
        };

        tracing::info!(
            "Run {} finished in {}ms: {} deals, {}/{} queries failed",
            report.run_id,
            (report.finished_at - report.started_at).num_milliseconds(),
            report.deals_found,
            report.queries_failed,
            report.queries_attempted
        );
        report
    }

    async fn send_notification(&self, deals: &[DealResult]) -> NotificationStatus {
        match self.notifier.notify(deals).await {
            Ok(receipt) => {
                metrics::counter!("dealbot_notifications_total").increment(1);
                NotificationStatus::Sent(receipt)
            }
            Err(e) => {
                tracing::error!("❌ Failed to send email: {}", e);
                metrics::counter!("dealbot_notification_failures_total").increment(1);
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}
