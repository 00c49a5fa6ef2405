//! MetricsPollerActor - polls live metrics for one instance
//!
//! One actor per mounted live view. It owns the [`RateSampler`], so the last
//! good counter reading stays with the task that produced it. Failed polls
//! are logged and reported, never recorded.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, instrument, trace, warn};

use crate::api::ApiClient;
use crate::sampler::{LivePoint, RateSampler};

use super::messages::{PollerCommand, PollerEvent};

/// Actor that polls a single instance for live metrics
pub struct MetricsPollerActor {
    /// API client (carries the session token)
    client: ApiClient,

    /// Instance being watched
    instance_id: String,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<PollerCommand>,

    /// Sender for samples and failures
    event_tx: mpsc::UnboundedSender<PollerEvent>,

    /// Last-seen counters
    sampler: RateSampler,

    /// Polling interval
    interval_duration: Duration,
}

impl MetricsPollerActor {
    pub fn new(
        client: ApiClient,
        instance_id: String,
        interval_duration: Duration,
        command_rx: mpsc::Receiver<PollerCommand>,
        event_tx: mpsc::UnboundedSender<PollerEvent>,
    ) -> Self {
        Self {
            client,
            instance_id,
            command_rx,
            event_tx,
            sampler: RateSampler::new(),
            interval_duration,
        }
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command arrives, the command channel closes, or
    /// nobody listens for events anymore.
    #[instrument(skip(self), fields(instance = %self.instance_id))]
    pub async fn run(mut self) {
        debug!("starting metrics poller");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.poll_metrics().await;
                    if self.event_tx.is_closed() {
                        debug!("event receiver dropped, stopping");
                        break;
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(PollerCommand::PollNow { respond_to }) => {
                            trace!("received PollNow command");
                            let result = self.poll_metrics().await;
                            let _ = respond_to.send(result);
                        }

                        Some(PollerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            debug!("all handles dropped, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("metrics poller stopped");
    }

    /// Fetch one reading, convert it and publish the result
    #[instrument(skip(self), fields(instance = %self.instance_id))]
    async fn poll_metrics(&mut self) -> Result<LivePoint> {
        match self.client.live_metrics(&self.instance_id).await {
            Ok(metrics) => {
                let point = self.sampler.sample(&metrics, Utc::now());
                trace!(
                    "cpu {:.1}% mem {:.0} MiB disk {:.0} B/s net {:.0} B/s",
                    point.cpu_percent,
                    point.memory_mib,
                    point.disk_rate(),
                    point.net_rate()
                );

                let _ = self.event_tx.send(PollerEvent::Sample(point.clone()));
                Ok(point)
            }
            Err(e) => {
                warn!("failed to poll live metrics: {e}");
                let _ = self.event_tx.send(PollerEvent::Failed(e.to_string()));
                Err(e).context("failed to poll live metrics")
            }
        }
    }
}

/// Handle for controlling a MetricsPollerActor
///
/// Dropping every handle, dropping the event receiver, or calling
/// [`PollerHandle::shutdown`] tears the poller down.
#[derive(Clone)]
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,

    pub instance_id: String,
}

impl PollerHandle {
    /// Spawn a poller for `instance_id` and return its handle and event stream
    pub fn spawn(
        client: ApiClient,
        instance_id: impl Into<String>,
        interval_duration: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PollerEvent>) {
        let instance_id = instance_id.into();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let actor = MetricsPollerActor::new(
            client,
            instance_id.clone(),
            interval_duration,
            cmd_rx,
            event_tx,
        );

        tokio::spawn(actor.run());

        (
            Self {
                sender: cmd_tx,
                instance_id,
            },
            event_rx,
        )
    }

    /// Trigger an immediate poll and wait for its result
    pub async fn poll_now(&self) -> Result<LivePoint> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive response")?
    }

    /// Stop the poller
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }

    /// Stop the poller without waiting (for use outside async code)
    pub fn stop(&self) {
        let _ = self.sender.try_send(PollerCommand::Shutdown);
    }
}
