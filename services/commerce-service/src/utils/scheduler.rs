// /commerce/services/commerce-service/src/utils/scheduler.rs

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{JobScheduler, Job};
use crate::{
    config::SweepConfig,
    core::order::{OrderService, SweepReport},
    utils::error::{AppError, AppResult},
};

// Metrics order sweep untuk endpoint maintenance
pub struct SweepMetrics {
    pub runs: AtomicU64,
    pub errors: AtomicU64,
    pub orders_removed: AtomicU64,
    pub orders_canceled: AtomicU64,
    pub last_run: RwLock<Option<DateTime<Utc>>>,
    pub scheduled: bool,
}

impl SweepMetrics {
    pub fn new(scheduled: bool) -> Arc<Self> {
        Arc::new(Self {
            runs: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            orders_removed: AtomicU64::new(0),
            orders_canceled: AtomicU64::new(0),
            last_run: RwLock::new(None),
            scheduled,
        })
    }

    async fn record(&self, report: &SweepReport) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(report.failed, Ordering::Relaxed);
        self.orders_removed.fetch_add(report.deleted, Ordering::Relaxed);
        self.orders_canceled.fetch_add(report.canceled, Ordering::Relaxed);
        *self.last_run.write().await = Some(Utc::now());
    }

    pub async fn get_status(&self) -> serde_json::Value {
        let last_run = self.last_run.read().await;
        serde_json::json!({
            "runs": self.runs.load(Ordering::Relaxed),
            "errors": self.errors.load(Ordering::Relaxed),
            "orders_removed": self.orders_removed.load(Ordering::Relaxed),
            "orders_canceled": self.orders_canceled.load(Ordering::Relaxed),
            "last_run": *last_run,
            "status": if self.scheduled { "scheduled" } else { "manual" }
        })
    }
}

/// Satu kali sweep, dipakai oleh cron job dan endpoint admin
pub async fn run_sweep(
    orders: &OrderService,
    metrics: &SweepMetrics,
    max_age_minutes: i64,
) -> AppResult<SweepReport> {
    match orders.sweep_stale_orders(Duration::minutes(max_age_minutes)).await {
        Ok(report) => {
            metrics.record(&report).await;
            Ok(report)
        }
        Err(e) => {
            metrics.runs.fetch_add(1, Ordering::Relaxed);
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            Err(e)
        }
    }
}

/// Start cron job order sweep. Hanya instance dengan ORDER_SWEEP_ENABLED=true yang memanggil ini.
pub async fn start_background_jobs(
    orders: Arc<OrderService>,
    metrics: Arc<SweepMetrics>,
    config: &SweepConfig,
) -> AppResult<JobScheduler> {
    let scheduler = JobScheduler::new().await
        .map_err(|e| AppError::Configuration(format!("Failed to create scheduler: {}", e)))?;

    let max_age_minutes = config.max_age_minutes;
    let sweep_job = Job::new_async(config.cron.as_str(), move |_uuid, _l| {
        let orders = orders.clone();
        let metrics = metrics.clone();
        Box::pin(async move {
            match run_sweep(&orders, &metrics, max_age_minutes).await {
                Ok(report) => tracing::debug!("Order sweep job selesai: {:?}", report),
                Err(e) => tracing::error!("Order sweep job gagal: {}", e),
            }
        })
    })
    .map_err(|e| AppError::Configuration(format!("Failed to create sweep job ({}): {}", config.cron, e)))?;

    scheduler.add(sweep_job).await
        .map_err(|e| AppError::Configuration(format!("Failed to add sweep job: {}", e)))?;

    scheduler.start().await
        .map_err(|e| AppError::Configuration(format!("Failed to start scheduler: {}", e)))?;

    tracing::info!("✅ Order sweep scheduler started ({}, max age {} menit)", config.cron, max_age_minutes);

    Ok(scheduler)
}
