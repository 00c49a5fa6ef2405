//! Application state management

use chrono::{DateTime, Utc};

use crate::api::types::HistoryRange;
use crate::guard::{GuardState, InstanceGuard};
use crate::sampler::{LIVE_WINDOW, LivePoint, SampleWindow};
use crate::store::Store;

/// Tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Instances,
    Metrics,
    Backups,
    Domains,
    Collaborators,
    Billing,
    Tickets,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Instances,
        Tab::Metrics,
        Tab::Backups,
        Tab::Domains,
        Tab::Collaborators,
        Tab::Billing,
        Tab::Tickets,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|tab| tab == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Instances => "Instances",
            Tab::Metrics => "Metrics",
            Tab::Backups => "Backups",
            Tab::Domains => "Domains",
            Tab::Collaborators => "Collaborators",
            Tab::Billing => "Billing",
            Tab::Tickets => "Tickets",
        }
    }

    /// Tabs that need a selected instance
    pub fn is_instance_scoped(&self) -> bool {
        matches!(
            self,
            Tab::Metrics | Tab::Backups | Tab::Domains | Tab::Collaborators
        )
    }
}

/// Outcome of the instance guard for the current tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Persisted state still loading
    Loading,
    /// Nothing selected, user was sent to the instance list
    Redirected,
    /// Tab may render
    Open,
}

/// What the metrics tab is charting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSource {
    Live,
    History(HistoryRange),
}

/// Application state
pub struct AppState {
    /// Current selected tab
    pub current_tab: Tab,

    /// Session, selection and fetched collections
    pub store: Store,

    /// Guard of the mounted tab (instance-scoped tabs only)
    guard: Option<InstanceGuard<Tab>>,

    /// Guard outcome of the last check
    pub gate: Gate,

    /// Whether the mounted tab has loaded its data
    pub loaded: bool,

    /// Rolling window of live points
    pub live: SampleWindow<LivePoint>,

    /// Points from the history endpoint
    pub history: Vec<LivePoint>,

    pub metrics_source: MetricsSource,

    /// Selected row in the current tab
    pub selected_row: usize,

    /// Paused state (stops live updates)
    pub paused: bool,

    /// Last successful live sample
    pub last_update: Option<DateTime<Utc>>,

    /// Last request succeeded
    pub connected: bool,

    /// Error banner (dismissable)
    pub error_message: Option<String>,

    /// Informational message shown in the footer
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: Store, live_window: usize) -> Self {
        Self {
            current_tab: Tab::Instances,
            store,
            guard: None,
            gate: Gate::Loading,
            loaded: false,
            live: SampleWindow::new(live_window.clamp(1, LIVE_WINDOW)),
            history: Vec::new(),
            metrics_source: MetricsSource::Live,
            selected_row: 0,
            paused: false,
            last_update: None,
            connected: false,
            error_message: None,
            status_message: None,
        }
    }

    /// Unmount the current tab and mount `tab`
    pub fn switch_tab(&mut self, tab: Tab) {
        if self.current_tab == Tab::Metrics {
            self.live.clear();
            self.history.clear();
            self.metrics_source = MetricsSource::Live;
        }

        self.current_tab = tab;
        self.selected_row = 0;
        self.loaded = false;
        self.guard = tab
            .is_instance_scoped()
            .then(|| InstanceGuard::new(Tab::Instances));
        self.gate = if tab.is_instance_scoped() || !self.store.is_hydrated() {
            Gate::Loading
        } else {
            Gate::Open
        };
    }

    /// Run the guard of the mounted tab; returns a redirect target if any
    pub fn check_guard(&mut self) -> Option<Tab> {
        let Some(guard) = self.guard.as_mut() else {
            self.gate = if self.store.is_hydrated() {
                Gate::Open
            } else {
                Gate::Loading
            };
            return None;
        };

        match guard.check(&self.store) {
            GuardState::Loading => {
                self.gate = Gate::Loading;
                None
            }
            GuardState::Redirect(target) => {
                self.gate = Gate::Redirected;
                Some(target)
            }
            GuardState::Redirected => {
                self.gate = Gate::Redirected;
                None
            }
            GuardState::Render(_) => {
                self.gate = Gate::Open;
                None
            }
        }
    }

    /// Add a live point unless paused
    pub fn add_live_point(&mut self, point: LivePoint) {
        if self.paused {
            return;
        }

        self.last_update = Some(point.at);
        self.live.push(point);
        self.connected = true;
    }

    /// Number of rows in the current tab
    pub fn row_count(&self) -> usize {
        match self.current_tab {
            Tab::Instances => self.store.instances.len(),
            Tab::Metrics => 0,
            Tab::Backups => self.store.backups.len(),
            Tab::Domains => self.store.domains.len(),
            Tab::Collaborators => self.store.collaborators.len(),
            Tab::Billing => self.store.subscriptions.len(),
            Tab::Tickets => self.store.tickets.len(),
        }
    }

    /// Select next item in current tab
    pub fn select_next(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.selected_row = (self.selected_row + 1) % count;
        }
    }

    /// Select previous item in current tab
    pub fn select_previous(&mut self) {
        let count = self.row_count();
        if count > 0 {
            self.selected_row = if self.selected_row == 0 {
                count - 1
            } else {
                self.selected_row - 1
            };
        }
    }

    /// Keep the selection inside the list after a refresh
    pub fn clamp_selection(&mut self) {
        let count = self.row_count();
        if self.selected_row >= count {
            self.selected_row = count.saturating_sub(1);
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Points the metrics tab should chart
    pub fn chart_points(&self) -> Vec<&LivePoint> {
        match self.metrics_source {
            MetricsSource::Live => self.live.iter().collect(),
            MetricsSource::History(_) => self.history.iter().collect(),
        }
    }
}
