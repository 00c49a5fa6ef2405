//! Main application logic

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::actors::messages::PollerEvent;
use crate::actors::poller::PollerHandle;
use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::sampler::history_series;
use crate::store::Store;

use super::{
    state::{AppState, Gate, MetricsSource, Tab},
    ui,
};

/// Main TUI application
pub struct App {
    config: Config,
    state: AppState,
    /// Reusable HTTP client for API requests
    client: ApiClient,
    /// Live poller of the mounted metrics tab
    poller: Option<(PollerHandle, mpsc::UnboundedReceiver<PollerEvent>)>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let store = Store::with_file(config.state_path());

        Ok(Self {
            state: AppState::new(store, config.live_window),
            config,
            client,
            poller: None,
        })
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // first frame shows the loading state while the store hydrates
        terminal.draw(|f| ui::render(f, &self.state))?;
        self.hydrate().await;

        // Run event loop
        let result = self.run_event_loop(&mut terminal).await;

        self.stop_poller();

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    /// Load persisted state and attach the session token to the client
    async fn hydrate(&mut self) {
        if let Err(e) = self.state.store.hydrate().await {
            self.state.error_message = Some(format!("Could not read saved session: {}", e));
        }

        self.client
            .set_token(self.state.store.token().map(str::to_string));

        if !self.state.store.is_authenticated() {
            self.state.error_message =
                Some("Not logged in; run `deckctl login` first".to_string());
        }
    }

    /// Main event loop
    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            self.mount_current_tab().await;

            // Render UI
            terminal.draw(|f| ui::render(f, &self.state))?;

            // Handle poller events (non-blocking)
            self.drain_poller_events();

            // Handle keyboard events (with timeout)
            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key_event(key.code).await?
            {
                break; // Quit
            }
        }

        Ok(())
    }

    /// Apply the guard and load data for a freshly mounted tab
    async fn mount_current_tab(&mut self) {
        if let Some(target) = self.state.check_guard() {
            tracing::debug!(
                "{} needs a selected instance, redirecting",
                self.state.current_tab.title()
            );
            self.state.status_message = Some("Select an instance first (Enter)".to_string());
            self.switch_tab(target);
            self.state.check_guard();
        }

        if self.state.gate != Gate::Open || self.state.loaded {
            return;
        }

        self.state.loaded = true;
        self.load_current_tab().await;
    }

    /// Fetch whatever the current tab renders
    async fn load_current_tab(&mut self) {
        let instance_id = self
            .state
            .store
            .selected_instance()
            .map(|instance| instance.id.clone());

        match (self.state.current_tab, instance_id) {
            (Tab::Instances, _) => self.load_instances().await,
            (Tab::Metrics, Some(id)) => self.start_poller(id),
            (Tab::Backups, Some(id)) => {
                let (backups, schedule) = futures::join!(
                    self.client.list_backups(&id),
                    self.client.backup_configuration(&id)
                );
                match backups {
                    Ok(backups) => self.state.store.backups = backups,
                    Err(e) => self.report("Failed to load backups", e),
                }
                match schedule {
                    Ok(schedule) => self.state.store.backup_configuration = Some(schedule),
                    Err(e) => self.report("Failed to load backup schedule", e),
                }
            }
            (Tab::Domains, Some(id)) => match self.client.list_domains(&id).await {
                Ok(domains) => self.state.store.domains = domains,
                Err(e) => self.report("Failed to load domains", e),
            },
            (Tab::Collaborators, Some(id)) => match self.client.list_collaborators(&id).await {
                Ok(collaborators) => self.state.store.collaborators = collaborators,
                Err(e) => self.report("Failed to load collaborators", e),
            },
            (Tab::Billing, _) => {
                let (subscriptions, plans) = futures::join!(
                    self.client.list_subscriptions(),
                    self.client.list_plans()
                );
                match subscriptions {
                    Ok(subscriptions) => self.state.store.subscriptions = subscriptions,
                    Err(e) => self.report("Failed to load subscriptions", e),
                }
                match plans {
                    Ok(plans) => self.state.store.plans = plans,
                    Err(e) => self.report("Failed to load plans", e),
                }
            }
            (Tab::Tickets, _) => match self.client.list_tickets().await {
                Ok(tickets) => self.state.store.tickets = tickets,
                Err(e) => self.report("Failed to load tickets", e),
            },
            (_, None) => {}
        }

        self.state.clamp_selection();
    }

    async fn load_instances(&mut self) {
        match self.client.list_instances().await {
            Ok(instances) => {
                self.state.connected = true;
                if let Err(e) = self.state.store.set_instances(instances).await {
                    self.state.error_message = Some(format!("Failed to save selection: {}", e));
                }
            }
            Err(e) => self.report("Failed to load instances", e),
        }
    }

    /// Show an API failure in the error banner
    fn report(&mut self, context: &str, err: ApiError) {
        tracing::error!("{context}: {err}");
        if matches!(err, ApiError::Transport(_)) {
            self.state.connected = false;
        }
        self.state.error_message = Some(format!("{}: {}", context, err));
    }

    fn start_poller(&mut self, instance_id: String) {
        self.stop_poller();

        let interval = Duration::from_secs(self.config.live_interval_secs.max(1));
        self.poller = Some(PollerHandle::spawn(
            self.client.clone(),
            instance_id,
            interval,
        ));
    }

    fn stop_poller(&mut self) {
        if let Some((handle, _events)) = self.poller.take() {
            handle.stop();
        }
    }

    fn drain_poller_events(&mut self) {
        let Some((_, events)) = self.poller.as_mut() else {
            return;
        };

        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }

        for event in drained {
            match event {
                PollerEvent::Sample(point) => {
                    self.state.add_live_point(point);
                }
                PollerEvent::Failed(message) => {
                    self.state.connected = false;
                    self.state.error_message = Some(format!("Live metrics: {}", message));
                }
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.state.current_tab == Tab::Metrics {
            self.stop_poller();
        }
        self.state.switch_tab(tab);
    }

    /// Enter on the instance list selects the highlighted instance
    async fn select_highlighted_instance(&mut self) {
        let Some(instance) = self
            .state
            .store
            .instances
            .get(self.state.selected_row)
            .cloned()
        else {
            return;
        };

        match self.state.store.select_instance(&instance).await {
            Ok(()) => {
                self.state.status_message = Some(format!("Selected {}", instance.name));
            }
            Err(e) => {
                self.state.error_message = Some(format!("Failed to save selection: {}", e));
            }
        }
    }

    async fn toggle_history(&mut self) {
        if let MetricsSource::History(_) = self.state.metrics_source {
            self.state.metrics_source = MetricsSource::Live;
            self.state.history.clear();
            return;
        }

        let Some(id) = self
            .state
            .store
            .selected_instance()
            .map(|instance| instance.id.clone())
        else {
            return;
        };

        let range = self.config.history_range;
        match self.client.metrics_history(&id, range).await {
            Ok(history) => {
                self.state.history = history_series(&history.points);
                self.state.metrics_source = MetricsSource::History(range);
            }
            Err(e) => self.report("Failed to load metrics history", e),
        }
    }

    async fn create_backup(&mut self) {
        let Some(id) = self
            .state
            .store
            .selected_instance()
            .map(|instance| instance.id.clone())
        else {
            return;
        };

        match self.client.create_backup(&id).await {
            Ok(backup) => {
                self.state.status_message = Some(format!("Backup {} started", backup.id));
                self.state.loaded = false;
            }
            Err(e) => self.report("Failed to create backup", e),
        }
    }

    async fn verify_highlighted_domain(&mut self) {
        let Some(domain_id) = self
            .state
            .store
            .domains
            .get(self.state.selected_row)
            .map(|domain| domain.id.clone())
        else {
            return;
        };

        match self.client.verify_domain(&domain_id).await {
            Ok(domain) => {
                self.state.status_message = Some(format!("{} is {}", domain.name, domain.status));
                if let Some(slot) = self
                    .state
                    .store
                    .domains
                    .iter_mut()
                    .find(|d| d.id == domain.id)
                {
                    *slot = domain;
                }
            }
            Err(e) => self.report("Failed to verify domain", e),
        }
    }

    /// Replace the highlighted ticket with its full conversation
    async fn open_highlighted_ticket(&mut self) {
        let Some(ticket_id) = self
            .state
            .store
            .tickets
            .get(self.state.selected_row)
            .map(|ticket| ticket.id.clone())
        else {
            return;
        };

        match self.client.get_ticket(&ticket_id).await {
            Ok(ticket) => {
                if let Some(slot) = self.state.store.tickets.get_mut(self.state.selected_row) {
                    *slot = ticket;
                }
            }
            Err(e) => self.report("Failed to load ticket", e),
        }
    }

    /// Handle keyboard event
    async fn handle_key_event(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(true); // Quit
            }
            KeyCode::Tab | KeyCode::Right => {
                self.switch_tab(self.state.current_tab.next());
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.switch_tab(self.state.current_tab.previous());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select_next();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_previous();
            }
            KeyCode::Enter if self.state.current_tab == Tab::Instances => {
                self.select_highlighted_instance().await;
            }
            KeyCode::Char(' ') => {
                self.state.toggle_pause();
            }
            KeyCode::Enter if self.state.current_tab == Tab::Tickets => {
                self.open_highlighted_ticket().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') if self.state.current_tab == Tab::Metrics => {
                self.toggle_history().await;
            }
            KeyCode::Char('b') | KeyCode::Char('B') if self.state.current_tab == Tab::Backups => {
                self.create_backup().await;
            }
            KeyCode::Char('v') | KeyCode::Char('V') if self.state.current_tab == Tab::Domains => {
                self.verify_highlighted_domain().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.state.loaded = false;
                if self.state.current_tab != Tab::Instances {
                    self.load_instances().await;
                }
            }
            KeyCode::Char('c') => {
                self.state.clear_error();
            }
            _ => {}
        }

        Ok(false)
    }
}
