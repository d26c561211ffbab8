//! Prometheus counters for the lifecycle engine.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Process-wide metric registry, initialized lazily exactly once.
pub struct Metrics {
    registry: Registry,
    pub crank_runs: IntCounter,
    pub claims_expired: IntCounter,
    pub reviews_auto_approved: IntCounter,
    pub quests_expired: IntCounter,
    pub crank_item_failures: IntCounter,
}

impl Metrics {
    /// The global metrics instance.
    pub fn global() -> &'static Metrics {
        METRICS.get_or_init(Metrics::new)
    }

    fn new() -> Self {
        let registry = Registry::new();

        let crank_runs =
            IntCounter::new("sidequest_crank_runs_total", "Completed crank runs").unwrap();
        let claims_expired = IntCounter::new(
            "sidequest_claims_expired_total",
            "Claims expired past their proof deadline",
        )
        .unwrap();
        let reviews_auto_approved = IntCounter::new(
            "sidequest_reviews_auto_approved_total",
            "Claims auto-approved past their review deadline",
        )
        .unwrap();
        let quests_expired = IntCounter::new(
            "sidequest_quests_expired_total",
            "Quests expired unclaimed past their deadline",
        )
        .unwrap();
        let crank_item_failures = IntCounter::new(
            "sidequest_crank_item_failures_total",
            "Per-item failures during crank sweeps",
        )
        .unwrap();

        for collector in [
            &crank_runs,
            &claims_expired,
            &reviews_auto_approved,
            &quests_expired,
            &crank_item_failures,
        ] {
            registry.register(Box::new(collector.clone())).unwrap();
        }

        Self {
            registry,
            crank_runs,
            claims_expired,
            reviews_auto_approved,
            quests_expired,
            crank_item_failures,
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .expect("text encoding never fails");
        String::from_utf8(buffer).expect("prometheus output is utf-8")
    }
}
