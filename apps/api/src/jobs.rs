//! Periodic background jobs. Only started in production.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<()>;
}

/// Does nothing. Used when no job is configured.
pub struct NoopJob;

#[async_trait]
impl ScheduledJob for NoopJob {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn run(&self) -> Result<()> {
        Ok(())
    }
}

/// Pings a URL so hosting platforms that idle inactive services keep this one awake.
pub struct KeepAlivePing {
    client: reqwest::Client,
    url: String,
}

impl KeepAlivePing {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build keep-alive HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ScheduledJob for KeepAlivePing {
    fn name(&self) -> &'static str {
        "keepalive"
    }

    async fn run(&self) -> Result<()> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {status}", self.url);
        }
        debug!("Keep-alive ping to {} returned {status}", self.url);
        Ok(())
    }
}

/// Runs `job` every `period`, first after one full period. Failures are logged
/// and the schedule continues.
pub fn spawn_scheduler(job: Arc<dyn ScheduledJob>, period: Duration) -> JoinHandle<()> {
    info!("Scheduling job '{}' every {:?}", job.name(), period);
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = job.run().await {
                warn!("Scheduled job '{}' failed: {e:#}", job.name());
            }
        }
    })
}
