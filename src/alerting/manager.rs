//! Alert manager implementation

use super::batcher::{BatchEntry, Batcher, FlushReport};
use super::channels::Channel;
use super::cooldown::CooldownGuard;
use super::dispatcher::{DispatchReport, Dispatcher};
use super::evaluator::Evaluator;
use super::events::{BacktestEvent, BotStatusEvent, MonitorEvent, TradeEvent};
use crate::config::{AlertingConfig, Validate};
use crate::storage::AlertStore;
use crate::utils::error::{AlertError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex as TokioMutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Handle to the background flush task
#[derive(Debug)]
struct FlushWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Alert manager: entry point for monitors and owner of the flush task
#[derive(Debug)]
pub struct AlertManager {
    config: AlertingConfig,
    store: Arc<dyn AlertStore>,
    channel: Arc<dyn Channel>,
    cooldowns: Arc<CooldownGuard>,
    evaluator: Evaluator,
    dispatcher: Dispatcher,
    batcher: Arc<Batcher>,
    /// Held across the await in `stop`, hence the tokio mutex
    worker: TokioMutex<Option<FlushWorker>>,
    active: AtomicBool,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(
        config: AlertingConfig,
        store: Arc<dyn AlertStore>,
        channel: Arc<dyn Channel>,
    ) -> Result<Self> {
        config.validate()?;

        let cooldowns = Arc::new(CooldownGuard::new());
        let batcher = Arc::new(Batcher::new(
            store.clone(),
            channel.clone(),
            cooldowns.clone(),
            config.send_timeout(),
            config.max_flush_retries,
        ));
        let evaluator = Evaluator::new(store.clone(), cooldowns.clone());
        let dispatcher = Dispatcher::new(
            store.clone(),
            channel.clone(),
            batcher.clone(),
            cooldowns.clone(),
            config.send_timeout(),
        );

        Ok(Self {
            config,
            store,
            channel,
            cooldowns,
            evaluator,
            dispatcher,
            batcher,
            worker: TokioMutex::new(None),
            active: AtomicBool::new(false),
        })
    }

    /// Start the background digest flush task
    pub async fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return Err(AlertError::internal("Alert manager is already running"));
        }

        info!(
            "Starting alert manager (batch interval {}s)",
            self.config.batch_interval_secs
        );

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let batcher = self.batcher.clone();
        let cooldowns = self.cooldowns.clone();
        let period = self.config.batch_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        batcher.flush().await;
                        let pruned = cooldowns.prune_expired(chrono::Utc::now());
                        if pruned > 0 {
                            debug!(pruned, "Expired cooldown reservations removed");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Alert flush task stopped");
        });

        *worker = Some(FlushWorker { shutdown, handle });
        self.active.store(true, Ordering::Release);
        Ok(())
    }

    /// Stop the flush task, run one last flush and report what is left.
    ///
    /// Returns the batched alerts that were not delivered within the grace
    /// period. Each of them is logged at error level and its audit row stays
    /// `queued`.
    pub async fn stop(&self) -> Result<Vec<BatchEntry>> {
        info!("Stopping alert manager");
        self.active.store(false, Ordering::Release);

        let grace = self.config.shutdown_grace();
        if let Some(FlushWorker {
            shutdown,
            mut handle,
        }) = self.worker.lock().await.take()
        {
            let _ = shutdown.send(true);
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Alert flush task ended abnormally: {}", e),
                Err(_) => {
                    warn!("Alert flush task did not stop within {:?}, aborting", grace);
                    handle.abort();
                    let _ = handle.await;
                }
            }
        }

        match tokio::time::timeout(grace, self.batcher.flush()).await {
            Ok(report) => debug!(?report, "Final digest flush completed"),
            Err(_) => warn!("Final digest flush did not complete within {:?}", grace),
        }

        let leftovers = self.batcher.drain();
        for entry in &leftovers {
            error!(
                rule_id = %entry.rule_id,
                resource_id = %entry.resource_id,
                event_id = %entry.event_id,
                subject = %entry.content.subject,
                "Dropping undelivered batched alert at shutdown"
            );
        }
        if !leftovers.is_empty() {
            warn!("{} batched alerts were not delivered", leftovers.len());
        }

        Ok(leftovers)
    }

    /// Check if the flush task is running
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub async fn handle_bot_status(&self, event: BotStatusEvent) -> Result<()> {
        self.handle_event(event.into()).await
    }

    pub async fn handle_trade(&self, event: TradeEvent) -> Result<()> {
        self.handle_event(event.into()).await
    }

    pub async fn handle_backtest(&self, event: BacktestEvent) -> Result<()> {
        self.handle_event(event.into()).await
    }

    /// Evaluate and dispatch one event.
    ///
    /// Returns `Err(Aggregate)` when individual deliveries or audit writes
    /// failed; the remaining matches are still dispatched.
    pub async fn handle_event(&self, event: MonitorEvent) -> Result<()> {
        self.dispatch_event(event).await?.into_result()
    }

    /// Evaluate and dispatch one event, returning the full report
    pub async fn dispatch_event(&self, event: MonitorEvent) -> Result<DispatchReport> {
        let matches = self.evaluator.match_event(&event).await?;
        if matches.is_empty() {
            return Ok(DispatchReport::default());
        }

        let report = self.dispatcher.process(matches).await;
        debug!(
            event = event.kind(),
            resource_id = event.resource_id(),
            sent = report.sent,
            queued = report.queued,
            suppressed = report.suppressed,
            failed = report.failed,
            dropped = report.dropped,
            "Alert event dispatched"
        );
        Ok(report)
    }

    /// Flush pending digests without waiting for the next tick
    pub async fn flush_now(&self) -> FlushReport {
        self.batcher.flush().await
    }

    /// Send a validation message through the configured channel
    pub async fn test_channel(&self, recipient: &str) -> Result<()> {
        let timeout = self.config.send_timeout();
        match tokio::time::timeout(timeout, self.channel.test(recipient)).await {
            Ok(result) => result,
            Err(_) => Err(AlertError::timeout(format!(
                "Channel test did not complete within {:?}",
                timeout
            ))),
        }
    }

    pub fn config(&self) -> &AlertingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AlertStore> {
        &self.store
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn batcher(&self) -> &Arc<Batcher> {
        &self.batcher
    }

    pub fn cooldowns(&self) -> &Arc<CooldownGuard> {
        &self.cooldowns
    }

    /// Batched alerts waiting for the next flush
    pub fn pending_alerts(&self) -> usize {
        self.batcher.pending_len()
    }
}
