use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::orchestrator::{DealBot, TickOutcome};
use crate::utils::error::Result;

/// Fires `DealBot::tick` on a fixed interval or a cron expression.
pub struct DealScheduler {
    scheduler: JobScheduler,
    bot: Arc<DealBot>,
    config: SchedulerConfig,
    job_id: Option<Uuid>,
}

impl DealScheduler {
    pub async fn new(bot: Arc<DealBot>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            bot,
            config,
            job_id: None,
        })
    }

    pub fn job_id(&self) -> Option<Uuid> {
        self.job_id
    }

    pub fn describe_schedule(&self) -> String {
        match &self.config.cron {
            Some(expr) => format!("cron '{}'", expr),
            None => format!("every {}s", self.config.interval_secs),
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.job_id.is_none() {
            let job = self.build_job()?;
            self.job_id = Some(self.scheduler.add(job).await?);
        }

        self.scheduler.start().await?;
        tracing::info!("Deal scheduler started ({})", self.describe_schedule());
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("Deal scheduler shutdown");
        Ok(())
    }

    fn build_job(&self) -> Result<Job> {
        let bot = Arc::clone(&self.bot);

        let run = move |_uuid: Uuid, _l: JobScheduler| {
            let bot = Arc::clone(&bot);
            Box::pin(async move {
                if let TickOutcome::Skipped = bot.tick().await {
                    tracing::debug!("Scheduled tick skipped, a run is still in progress");
                }
            }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        };

        let job = match &self.config.cron {
            Some(expr) => Job::new_async(expr.as_str(), run)?,
            None => Job::new_repeated_async(self.config.interval(), run)?,
        };
        Ok(job)
    }
}
