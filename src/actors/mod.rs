//! Background tasks of the dashboard
//!
//! The only recurring task is the live metrics poller. It runs as its own
//! tokio task and talks to the UI loop exclusively through channels:
//!
//! ```text
//! Timer tick → GET /instances/{id}/metrics → RateSampler → PollerEvent → UI window
//!     ↑
//!     └─── Commands (PollNow, Shutdown)
//! ```

pub mod messages;
pub mod poller;
