//! Command line client for the instance hosting backend
//!
//! Shares the persisted session and selected instance with the dashboard.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use instance_deck::{
    ApiClient, AuthSession, Config, Store,
    actors::{messages::PollerEvent, poller::PollerHandle},
    api::types::{
        BackupFrequency, CreateInstanceRequest, HistoryRange, OpenTicketRequest, Permission,
    },
    guard::{GuardState, InstanceGuard},
    sampler::{LivePoint, history_series},
    util::{format_bytes, format_rate, format_timestamp},
};
use tracing::{debug, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "deckctl")]
#[command(about = "Manage hosted instances from the command line", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL (overrides config file and API_BASE_URL)
    #[arg(short, long, global = true, value_name = "URL")]
    url: Option<String>,

    /// Instance to act on instead of the selected one
    #[arg(short, long, global = true, value_name = "ID")]
    instance: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session and the selected instance
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Instances of the account
    #[command(subcommand)]
    Instances(InstanceCommand),
    /// Resource usage of the selected instance
    #[command(subcommand)]
    Metrics(MetricsCommand),
    /// Backups of the selected instance
    #[command(subcommand)]
    Backups(BackupCommand),
    /// Custom domains of the selected instance
    #[command(subcommand)]
    Domains(DomainCommand),
    /// Git collaborators of the selected instance
    #[command(subcommand)]
    Collaborators(CollaboratorCommand),
    /// Subscriptions and plans
    #[command(subcommand)]
    Subscriptions(SubscriptionCommand),
    /// Help tickets
    #[command(subcommand)]
    Tickets(TicketCommand),
}

#[derive(Debug, Subcommand)]
enum InstanceCommand {
    List,
    Show { id: Option<String> },
    /// Remember an instance for instance-scoped commands
    Select { id: String },
    Create {
        name: String,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        version: Option<String>,
    },
    Delete { id: String },
    Restart { id: Option<String> },
}

#[derive(Debug, Subcommand)]
enum MetricsCommand {
    /// Poll live metrics and print derived rates
    Live {
        /// Number of samples to print
        #[arg(short = 'n', long, default_value_t = 10)]
        samples: usize,
        /// Seconds between polls (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the metrics history
    History {
        /// 1h, 6h, 24h or 7d (defaults to the configured range)
        #[arg(short, long)]
        range: Option<HistoryRange>,
    },
}

#[derive(Debug, Subcommand)]
enum BackupCommand {
    List,
    Create,
    Restore { backup_id: String },
    Delete { backup_id: String },
    /// Show the automatic backup schedule
    Schedule,
    /// Change the automatic backup schedule
    SetSchedule {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        frequency: Option<BackupFrequency>,
        /// HH:MM in UTC
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        retention_days: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
enum DomainCommand {
    List,
    Add { name: String },
    Verify { domain_id: String },
    Remove { domain_id: String },
}

#[derive(Debug, Subcommand)]
enum CollaboratorCommand {
    List,
    Add {
        username: String,
        /// read, write or admin
        #[arg(short, long, default_value = "write")]
        permission: Permission,
    },
    Remove { username: String },
}

#[derive(Debug, Subcommand)]
enum SubscriptionCommand {
    List,
    /// Available plans (no login needed)
    Plans,
    Subscribe {
        plan_id: String,
        /// Attach the subscription to the selected instance
        #[arg(long)]
        for_instance: bool,
    },
    Cancel { subscription_id: String },
}

#[derive(Debug, Subcommand)]
enum TicketCommand {
    List,
    Show {
        ticket_id: String,
    },
    Open {
        subject: String,
        body: String,
        /// Link the ticket to the selected instance
        #[arg(long)]
        for_instance: bool,
    },
    Reply {
        ticket_id: String,
        body: String,
    },
    Close {
        ticket_id: String,
    },
}

fn init(verbose: u8, debug: bool) {
    let level = match (verbose, debug) {
        (0, false) => LevelFilter::WARN,
        (0, true) | (1, _) => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = filter::Targets::new()
        .with_targets(vec![("instance_deck", level), ("deckctl", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

/// Everything a command needs
struct Session {
    config: Config,
    client: ApiClient,
    store: Store,
    instance: Option<String>,
}

impl Session {
    async fn open(config: Config, instance: Option<String>) -> Result<Self> {
        let mut store = Store::with_file(config.state_path());
        if let Err(e) = store.hydrate().await {
            warn!("could not read saved session: {e}");
        }

        let client = ApiClient::new(&config)?.with_token(store.token().map(str::to_string));

        Ok(Self {
            config,
            client,
            store,
            instance,
        })
    }

    /// Instance for scoped commands: `--instance`, then the selection
    fn instance_id(&self) -> Result<String> {
        if let Some(id) = &self.instance {
            return Ok(id.clone());
        }

        let mut guard = InstanceGuard::new(());
        match guard.check(&self.store) {
            GuardState::Render(instance) => Ok(instance.id.clone()),
            _ => bail!("no instance selected; run `deckctl instances select <id>`"),
        }
    }

    async fn remember(&mut self, session: AuthSession) -> Result<()> {
        println!("Logged in as {}", session.user.email);
        self.store
            .login(session)
            .await
            .context("failed to save session")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let config = Config {
        api_url: args.url.unwrap_or(config.api_url),
        ..config
    };

    init(args.verbose, config.debug);
    debug!("using API at {}", config.base_url());

    let mut session = Session::open(config, args.instance).await?;

    match args.command {
        Command::Login { email, password } => {
            let auth = session.client.login(&email, &password).await?;
            session
                .remember(AuthSession {
                    token: auth.token,
                    user: auth.user,
                })
                .await?;
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let auth = session.client.register(&name, &email, &password).await?;
            session
                .remember(AuthSession {
                    token: auth.token,
                    user: auth.user,
                })
                .await?;
        }
        Command::Logout => {
            if session.client.token().is_some()
                && let Err(e) = session.client.logout().await
            {
                warn!("server logout failed: {e}");
            }
            session.store.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = session.client.me().await?;
            println!("{} <{}>", user.name.as_deref().unwrap_or("-"), user.email);
            if let Some(instance) = session.store.selected_instance() {
                println!("selected instance: {} ({})", instance.name, instance.id);
            }
        }
        Command::Instances(command) => instances(&mut session, command).await?,
        Command::Metrics(command) => metrics(&session, command).await?,
        Command::Backups(command) => backups(&session, command).await?,
        Command::Domains(command) => domains(&session, command).await?,
        Command::Collaborators(command) => collaborators(&session, command).await?,
        Command::Subscriptions(command) => subscriptions(&session, command).await?,
        Command::Tickets(command) => tickets(&session, command).await?,
    }

    Ok(())
}

async fn instances(session: &mut Session, command: InstanceCommand) -> Result<()> {
    match command {
        InstanceCommand::List => {
            let instances = session.client.list_instances().await?;
            let selected = session.store.selected_instance().map(|i| i.id.clone());

            println!("\tid\tname\tstatus\tcpu\tmemory");
            for instance in &instances {
                let marker = if Some(&instance.id) == selected.as_ref() {
                    "*"
                } else {
                    ""
                };
                println!(
                    "{}\t{}\t{}\t{}\t{:.1}%\t{:.0} MiB",
                    marker,
                    instance.id,
                    instance.name,
                    instance.status,
                    instance.usage.cpu_percent,
                    instance.usage.memory_mib
                );
            }

            session.store.set_instances(instances).await?;
        }
        InstanceCommand::Show { id } => {
            let id = match id {
                Some(id) => id,
                None => session.instance_id()?,
            };
            let instance = session.client.get_instance(&id).await?;
            println!("{}", serde_json::to_string_pretty(&instance)?);
        }
        InstanceCommand::Select { id } => {
            let instance = session.client.get_instance(&id).await?;
            session.store.select_instance(&instance).await?;
            println!("Selected {} ({})", instance.name, instance.id);
        }
        InstanceCommand::Create {
            name,
            plan,
            version,
        } => {
            let request = CreateInstanceRequest {
                name,
                plan_id: plan,
                version,
            };
            let instance = session.client.create_instance(&request).await?;
            println!("Created {} ({}), status {}", instance.name, instance.id, instance.status);
        }
        InstanceCommand::Delete { id } => {
            session.client.delete_instance(&id).await?;
            session.store.instance_deleted(&id).await?;
            println!("Deleted {id}");
        }
        InstanceCommand::Restart { id } => {
            let id = match id {
                Some(id) => id,
                None => session.instance_id()?,
            };
            session.client.restart_instance(&id).await?;
            println!("Restarting {id}");
        }
    }

    Ok(())
}

fn print_point(point: &LivePoint) {
    println!(
        "{}\t{:.1}%\t{:.0} MiB\tdisk r {} w {}\tnet rx {} tx {}",
        point.at.format("%Y-%m-%d %H:%M:%S"),
        point.cpu_percent,
        point.memory_mib,
        format_rate(point.disk_read_rate),
        format_rate(point.disk_write_rate),
        format_rate(point.net_rx_rate),
        format_rate(point.net_tx_rate),
    );
}

/// Consecutive failed polls after which `metrics live` gives up
const MAX_LIVE_FAILURES: u32 = 3;

async fn metrics(session: &Session, command: MetricsCommand) -> Result<()> {
    let instance_id = session.instance_id()?;

    match command {
        MetricsCommand::Live { samples, interval } => {
            let interval = interval.unwrap_or(session.config.live_interval_secs).max(1);
            let (handle, mut events) = PollerHandle::spawn(
                session.client.clone(),
                instance_id,
                Duration::from_secs(interval),
            );

            let mut printed = 0;
            let mut failures = 0;
            while printed < samples {
                match events.recv().await {
                    Some(PollerEvent::Sample(point)) => {
                        failures = 0;
                        printed += 1;
                        print_point(&point);
                    }
                    Some(PollerEvent::Failed(message)) => {
                        failures += 1;
                        warn!("poll failed: {message}");
                        if failures >= MAX_LIVE_FAILURES {
                            handle.stop();
                            bail!("live metrics unavailable: {message}");
                        }
                    }
                    None => break,
                }
            }

            handle.shutdown().await?;
        }
        MetricsCommand::History { range } => {
            let range = range.unwrap_or(session.config.history_range);
            let history = session.client.metrics_history(&instance_id, range).await?;
            let series = history_series(&history.points);

            if series.is_empty() {
                println!("No history for {range}");
            }
            for point in &series {
                print_point(point);
            }
        }
    }

    Ok(())
}

async fn backups(session: &Session, command: BackupCommand) -> Result<()> {
    let client = &session.client;

    match command {
        BackupCommand::List => {
            let instance_id = session.instance_id()?;
            println!("id\tstatus\tkind\tsize\tcreated");
            for backup in client.list_backups(&instance_id).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    backup.id,
                    backup.status,
                    backup.kind.as_deref().unwrap_or("-"),
                    backup
                        .size_bytes
                        .map(|size| format_bytes(size as f64))
                        .unwrap_or_else(|| "-".to_string()),
                    format_timestamp(backup.created_at.as_ref()),
                );
            }
        }
        BackupCommand::Create => {
            let instance_id = session.instance_id()?;
            let backup = client.create_backup(&instance_id).await?;
            println!("Backup {} {}", backup.id, backup.status);
        }
        BackupCommand::Restore { backup_id } => {
            client.restore_backup(&backup_id).await?;
            println!("Restoring {backup_id}");
        }
        BackupCommand::Delete { backup_id } => {
            client.delete_backup(&backup_id).await?;
            println!("Deleted {backup_id}");
        }
        BackupCommand::Schedule => {
            let instance_id = session.instance_id()?;
            let schedule = client.backup_configuration(&instance_id).await?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        BackupCommand::SetSchedule {
            enabled,
            frequency,
            time,
            retention_days,
        } => {
            let instance_id = session.instance_id()?;
            let mut schedule = client.backup_configuration(&instance_id).await?;

            if let Some(enabled) = enabled {
                schedule.enabled = enabled;
            }
            if let Some(frequency) = frequency {
                schedule.frequency = frequency;
            }
            if time.is_some() {
                schedule.time_of_day = time;
            }
            if let Some(days) = retention_days {
                schedule.retention_days = days;
            }

            let schedule = client
                .update_backup_configuration(&instance_id, &schedule)
                .await?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
    }

    Ok(())
}

async fn domains(session: &Session, command: DomainCommand) -> Result<()> {
    let client = &session.client;

    match command {
        DomainCommand::List => {
            let instance_id = session.instance_id()?;
            println!("id\tdomain\tstatus\tprimary\ttarget");
            for domain in client.list_domains(&instance_id).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    domain.id,
                    domain.name,
                    domain.status,
                    if domain.is_primary { "yes" } else { "" },
                    domain.dns_target.as_deref().unwrap_or("-"),
                );
            }
        }
        DomainCommand::Add { name } => {
            let instance_id = session.instance_id()?;
            let domain = client.add_domain(&instance_id, &name).await?;
            println!("Added {} ({})", domain.name, domain.status);
            if let Some(target) = domain.dns_target {
                println!("Point a CNAME record for {} at {}", domain.name, target);
            }
        }
        DomainCommand::Verify { domain_id } => {
            let domain = client.verify_domain(&domain_id).await?;
            println!("{} is {}", domain.name, domain.status);
        }
        DomainCommand::Remove { domain_id } => {
            client.remove_domain(&domain_id).await?;
            println!("Removed {domain_id}");
        }
    }

    Ok(())
}

async fn collaborators(session: &Session, command: CollaboratorCommand) -> Result<()> {
    let client = &session.client;
    let instance_id = session.instance_id()?;

    match command {
        CollaboratorCommand::List => {
            println!("username\temail\tpermission\tadded");
            for collaborator in client.list_collaborators(&instance_id).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    collaborator.username,
                    collaborator.email.as_deref().unwrap_or("-"),
                    collaborator.permission,
                    format_timestamp(collaborator.added_at.as_ref()),
                );
            }
        }
        CollaboratorCommand::Add {
            username,
            permission,
        } => {
            let collaborator = client
                .add_collaborator(&instance_id, &username, permission)
                .await?;
            println!(
                "Added {} with {} access",
                collaborator.username, collaborator.permission
            );
        }
        CollaboratorCommand::Remove { username } => {
            client.remove_collaborator(&instance_id, &username).await?;
            println!("Removed {username}");
        }
    }

    Ok(())
}

async fn subscriptions(session: &Session, command: SubscriptionCommand) -> Result<()> {
    let client = &session.client;

    match command {
        SubscriptionCommand::List => {
            println!("id\tplan\tstatus\tinstance\trenews");
            for subscription in client.list_subscriptions().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    subscription.id,
                    subscription
                        .plan_name
                        .as_deref()
                        .unwrap_or(&subscription.plan_id),
                    subscription.status,
                    subscription.instance_id.as_deref().unwrap_or("-"),
                    format_timestamp(subscription.current_period_end.as_ref()),
                );
            }
        }
        SubscriptionCommand::Plans => {
            println!("id\tname\tprice\tfeatures");
            for plan in client.list_plans().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    plan.id,
                    plan.name,
                    plan.price_label(),
                    plan.features.join(", ")
                );
            }
        }
        SubscriptionCommand::Subscribe {
            plan_id,
            for_instance,
        } => {
            let instance_id = if for_instance {
                Some(session.instance_id()?)
            } else {
                None
            };
            let subscription = client
                .subscribe(&plan_id, instance_id.as_deref())
                .await?;
            println!("Subscription {} {}", subscription.id, subscription.status);
        }
        SubscriptionCommand::Cancel { subscription_id } => {
            client.cancel_subscription(&subscription_id).await?;
            println!("Canceled {subscription_id}");
        }
    }

    Ok(())
}

async fn tickets(session: &Session, command: TicketCommand) -> Result<()> {
    let client = &session.client;

    match command {
        TicketCommand::List => {
            println!("id\tstatus\tsubject\tupdated");
            for ticket in client.list_tickets().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    ticket.id,
                    ticket.status,
                    ticket.subject,
                    format_timestamp(ticket.updated_at.or(ticket.created_at).as_ref()),
                );
            }
        }
        TicketCommand::Show { ticket_id } => {
            let ticket = client.get_ticket(&ticket_id).await?;
            println!("{} [{}]", ticket.subject, ticket.status);
            for message in &ticket.messages {
                println!();
                println!(
                    "{} ({})",
                    message.author,
                    format_timestamp(message.created_at.as_ref())
                );
                println!("{}", message.body);
            }
        }
        TicketCommand::Open {
            subject,
            body,
            for_instance,
        } => {
            let instance_id = if for_instance {
                Some(session.instance_id()?)
            } else {
                None
            };
            let ticket = client
                .open_ticket(&OpenTicketRequest {
                    subject,
                    body,
                    instance_id,
                })
                .await?;
            println!("Opened ticket {}", ticket.id);
        }
        TicketCommand::Reply { ticket_id, body } => {
            let ticket = client.reply_to_ticket(&ticket_id, &body).await?;
            println!("Replied to {} ({} messages)", ticket.id, ticket.messages.len());
        }
        TicketCommand::Close { ticket_id } => {
            client.close_ticket(&ticket_id).await?;
            println!("Closed {ticket_id}");
        }
    }

    Ok(())
}
