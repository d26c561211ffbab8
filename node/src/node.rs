//! Process wiring and background task lifecycle.

use crate::config::NodeConfig;
use crate::metrics::Metrics;
use crate::NodeError;
use sidequest_claims::ClaimLedger;
use sidequest_crank::Crank;
use sidequest_media::{MediaStore, MemoryMediaStore};
use sidequest_pipeline::{
    HttpAnalyzer, HttpTranscriber, QueueConsumer, VerificationQueue, VerificationWorker,
};
use sidequest_registry::QuestRegistry;
use sidequest_settlement::{HttpLedgerClient, SettlementGateway};
use sidequest_store::Store;
use sidequest_store_memory::MemoryStore;
use sidequest_types::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The assembled Sidequest service.
///
/// Owns the engines the API layer calls into, plus two background tasks:
/// the verification queue consumer and the crank timer.
pub struct SidequestNode {
    pub registry: Arc<QuestRegistry>,
    pub claims: Arc<ClaimLedger>,
    pub queue: VerificationQueue,
    pub crank: Arc<Crank>,
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaStore>,
    config: NodeConfig,
    consumer: Option<QueueConsumer>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SidequestNode {
    /// Wire every component from configuration.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        // Durable state lives in the ledger database; the in-memory backend
        // stands in until an on-disk backend lands.
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let store_dyn: Arc<dyn Store> = store;
        let media: Arc<dyn MediaStore> =
            Arc::new(MemoryMediaStore::new(config.media_public_url.clone()));

        let gateway = Arc::new(SettlementGateway::new(
            Arc::new(HttpLedgerClient::new(&config.ledger_rpc_url)),
            config.settlement_keypair()?,
            config.program(),
            config.treasury(),
            Duration::from_secs(config.settlement_timeout_secs),
        ));

        let registry = Arc::new(QuestRegistry::new(
            store_dyn.clone(),
            config.params.clone(),
            config.program(),
        ));
        let claims = Arc::new(ClaimLedger::new(
            store_dyn.clone(),
            gateway.clone(),
            config.params.clone(),
            config.program(),
        ));

        let worker = Arc::new(VerificationWorker::new(
            store_dyn.clone(),
            media.clone(),
            Arc::new(HttpTranscriber::new(
                &config.stt_endpoint,
                &config.stt_api_key,
                &config.stt_model,
            )),
            Arc::new(HttpAnalyzer::new(
                &config.analysis_endpoint,
                &config.analysis_api_key,
                &config.analysis_model,
            )),
            claims.clone(),
            config.params.clone(),
        ));

        let (queue, rx) = VerificationQueue::new();
        let consumer = QueueConsumer::new(
            worker,
            queue.clone(),
            rx,
            config.max_job_attempts,
            config.max_concurrent_jobs,
        );

        let crank = Arc::new(Crank::new(store_dyn.clone(), gateway, claims.clone()));
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            registry,
            claims,
            queue,
            crank,
            store: store_dyn,
            media,
            config,
            consumer: Some(consumer),
            shutdown,
            tasks: Vec::new(),
        })
    }

    /// Spawn the queue consumer and the crank timer.
    pub fn start(&mut self) -> Result<(), NodeError> {
        let consumer = self
            .consumer
            .take()
            .ok_or_else(|| NodeError::Startup("node already started".into()))?;
        self.tasks.push(tokio::spawn(consumer.run()));

        let crank = self.crank.clone();
        let interval = Duration::from_secs(self.config.crank_interval_secs.max(1));
        let mut shutdown = self.shutdown.subscribe();
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match crank.run_once(Timestamp::now()).await {
                            Ok(report) => {
                                let metrics = Metrics::global();
                                metrics.crank_runs.inc();
                                metrics.claims_expired.inc_by(report.expired_claims as u64);
                                metrics
                                    .reviews_auto_approved
                                    .inc_by(report.auto_approved as u64);
                                metrics.quests_expired.inc_by(report.expired_quests as u64);
                                metrics
                                    .crank_item_failures
                                    .inc_by(report.failures.len() as u64);
                            }
                            Err(err) => tracing::error!(%err, "crank run failed"),
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
        }));

        tracing::info!(
            crank_interval_secs = self.config.crank_interval_secs,
            "sidequest node started"
        );
        Ok(())
    }

    /// Signal the background tasks and wait for them to finish.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
        tracing::info!("sidequest node stopped");
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}
