//! TUI Dashboard Module
//!
//! Terminal dashboard for the hosted instances of the logged-in account.

#[cfg(feature = "dashboard")]
mod app;
#[cfg(feature = "dashboard")]
mod state;
#[cfg(feature = "dashboard")]
mod ui;

#[cfg(feature = "dashboard")]
pub use app::App;
#[cfg(feature = "dashboard")]
pub use state::{AppState, Gate, Tab};
