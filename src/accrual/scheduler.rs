//! Accrual Scheduler
//!
//! Periodic driver for the accrual engine. The scheduler is an explicit
//! component with its own lifecycle: constructed with a pool and an
//! interval, started onto a task, stopped through a shutdown channel that
//! lets the in-flight cycle finish.
//!
//! Multiple service instances coordinate through a per-day lease row in
//! `accrual_runs`: whichever instance inserts the row first runs the cycle,
//! the rest skip the tick.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;

use super::{AccrualEngine, AccrualReport};

/// Default cadence: one accrual run per day.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct AccrualScheduler {
    engine: AccrualEngine,
    pool: PgPool,
    tick_interval: Duration,
}

impl AccrualScheduler {
    pub fn new(pool: PgPool) -> Self {
        Self::with_interval(pool, DEFAULT_INTERVAL)
    }

    pub fn with_interval(pool: PgPool, tick_interval: Duration) -> Self {
        Self {
            engine: AccrualEngine::new(pool.clone()),
            pool,
            tick_interval,
        }
    }

    /// Start the scheduler in the background.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    /// Scheduler loop. A shutdown signal observed mid-cycle takes effect
    /// after the current cycle completes.
    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.tick_interval.as_secs(), "Accrual scheduler started");

        let mut ticker = interval(self.tick_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Accrual scheduler stopped");
    }

    /// One scheduler tick: claim today's lease, run the cycle, record the
    /// outcome on the lease row.
    async fn tick(&self) {
        match self.run_once().await {
            Ok(Some(report)) => {
                tracing::info!(
                    processed = report.processed,
                    failed = report.failed,
                    "Scheduled accrual run completed"
                );
            }
            Ok(None) => {
                tracing::debug!("Accrual run already claimed for this period");
            }
            Err(e) => {
                tracing::error!(error = %e, "Accrual run failed");
            }
        }
    }

    /// Claim today's lease and run one cycle (for manual trigger or
    /// testing). Returns `None` when another instance already holds the
    /// lease for this date.
    pub async fn run_once(&self) -> Result<Option<AccrualReport>, sqlx::Error> {
        let as_of = Utc::now();
        let run_date = as_of.date_naive();

        if !self.claim_run(run_date).await? {
            return Ok(None);
        }

        let report = self.engine.run_cycle(as_of).await;
        self.record_run(run_date, &report).await?;
        Ok(Some(report))
    }

    /// Claim the per-day lease. Returns false when another instance (or an
    /// earlier tick) already ran this date.
    async fn claim_run(&self, run_date: NaiveDate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO accrual_runs (run_date)
            VALUES ($1)
            ON CONFLICT (run_date) DO NOTHING
            "#,
        )
        .bind(run_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write the run summary back onto the lease row.
    async fn record_run(
        &self,
        run_date: NaiveDate,
        report: &AccrualReport,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accrual_runs
            SET processed = $2, skipped = $3, failed = $4, completed_at = $5
            WHERE run_date = $1
            "#,
        )
        .bind(run_date)
        .bind(report.processed as i64)
        .bind(report.skipped as i64)
        .bind(report.failed as i64)
        .bind(report.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
