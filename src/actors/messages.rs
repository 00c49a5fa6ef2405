//! Message types for the metrics poller
//!
//! Commands travel from the dashboard to the poller over an mpsc channel;
//! samples and failures travel back as events.

use tokio::sync::oneshot;

use crate::sampler::LivePoint;

/// Event published after every poll attempt
#[derive(Debug, Clone)]
pub enum PollerEvent {
    /// A successful fetch, converted into rates
    Sample(LivePoint),

    /// The fetch failed; window and reference counters are untouched
    Failed(String),
}

/// Commands that can be sent to a MetricsPollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Poll immediately (bypassing the interval timer)
    PollNow {
        /// Channel to send the result back
        respond_to: oneshot::Sender<anyhow::Result<LivePoint>>,
    },

    /// Stop polling; the actor exits after the current request
    Shutdown,
}
