use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct PlannerMetrics {
    plans_total: AtomicU64,
    rejected_total: AtomicU64,
    visits_total: AtomicU64,
    empty_days_total: AtomicU64,
    itineraries_saved_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub plans_total: u64,
    pub rejected_total: u64,
    pub visits_total: u64,
    pub empty_days_total: u64,
    pub itineraries_saved_total: u64,
    pub avg_latency_micros: f64,
}

impl PlannerMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_plan(&self, visits: usize, empty_days: usize, duration: Duration) {
        self.plans_total.fetch_add(1, Ordering::Relaxed);
        self.visits_total.fetch_add(visits as u64, Ordering::Relaxed);
        self.empty_days_total
            .fetch_add(empty_days as u64, Ordering::Relaxed);
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        metrics::counter!("rihla_plans_total").increment(1);
        metrics::counter!("rihla_visits_scheduled_total").increment(visits as u64);
        metrics::histogram!("rihla_plan_duration_seconds").record(duration.as_secs_f64());
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rihla_plans_rejected_total").increment(1);
    }

    pub fn inc_saved(&self) {
        self.itineraries_saved_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rihla_itineraries_saved_total").increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let plans = self.plans_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            plans_total: plans,
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            visits_total: self.visits_total.load(Ordering::Relaxed),
            empty_days_total: self.empty_days_total.load(Ordering::Relaxed),
            itineraries_saved_total: self.itineraries_saved_total.load(Ordering::Relaxed),
            avg_latency_micros: if plans == 0 {
                0.0
            } else {
                latency as f64 / plans as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,rihla_concierge=info,rihla_catalog=info,rihla_core=warn",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_latency() {
        let metrics = PlannerMetrics::default();
        metrics.record_plan(4, 1, Duration::from_micros(300));
        metrics.record_plan(2, 0, Duration::from_micros(100));
        metrics.inc_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.plans_total, 2);
        assert_eq!(snapshot.visits_total, 6);
        assert_eq!(snapshot.empty_days_total, 1);
        assert_eq!(snapshot.rejected_total, 1);
        assert_eq!(snapshot.avg_latency_micros, 200.0);
    }
}
