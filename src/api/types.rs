//! Wire types for the backend's JSON contracts
//!
//! These types are shared between the library, the terminal dashboard and the
//! command line client. They are lenient on input: optional fields default,
//! unknown status strings map to an `Unknown` variant, and ids are accepted
//! as either JSON strings or numbers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Helpers
// ============================================================================

/// Accept `"42"` as well as `42` for identifiers
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// List responses come either bare or wrapped in an envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Data { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Items { items } => items,
            ListEnvelope::Data { data } => data,
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Authenticated user profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Instances
// ============================================================================

/// Lifecycle status of a hosted instance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Running,
    Pending,
    Stopped,
    Failed,
    Deleting,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Pending => "pending",
            InstanceStatus::Stopped => "stopped",
            InstanceStatus::Failed => "failed",
            InstanceStatus::Deleting => "deleting",
            InstanceStatus::Unknown => "unknown",
        })
    }
}

/// Resource usage snapshot reported with an instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceUsage {
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_mib: f64,
    #[serde(default)]
    pub disk_gib: Option<f64>,
}

/// A hosted deployment of the managed product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub usage: ResourceUsage,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateInstanceRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Metrics
// ============================================================================

/// One live metrics reading; block and network values are cumulative counters
///
/// The counters are required: a reading without them would become the
/// sampler's reference and turn the next good reading into a spike.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LiveMetrics {
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_mib: f64,
    pub block_read_bytes: u64,
    pub block_write_bytes: u64,
    pub net_rx_bytes: u64,
    pub net_tx_bytes: u64,
}

/// Timestamped reading from the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: LiveMetrics,
}

/// Response of `/instances/{id}/metrics/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsHistory {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub points: Vec<HistoryPoint>,
}

/// Window requested from the history endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HistoryRange {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    OneWeek,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneHour => "1h",
            HistoryRange::SixHours => "6h",
            HistoryRange::OneDay => "24h",
            HistoryRange::OneWeek => "7d",
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(HistoryRange::OneHour),
            "6h" => Ok(HistoryRange::SixHours),
            "24h" | "1d" => Ok(HistoryRange::OneDay),
            "7d" => Ok(HistoryRange::OneWeek),
            other => Err(format!("unknown history range '{other}' (use 1h, 6h, 24h or 7d)")),
        }
    }
}

// ============================================================================
// Backups
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackupStatus::Pending => "pending",
            BackupStatus::Running => "running",
            BackupStatus::Completed => "completed",
            BackupStatus::Failed => "failed",
            BackupStatus::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backup {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub status: BackupStatus,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    Hourly,
    #[default]
    Daily,
    Weekly,
}

impl fmt::Display for BackupFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackupFrequency::Hourly => "hourly",
            BackupFrequency::Daily => "daily",
            BackupFrequency::Weekly => "weekly",
        })
    }
}

impl FromStr for BackupFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(BackupFrequency::Hourly),
            "daily" => Ok(BackupFrequency::Daily),
            "weekly" => Ok(BackupFrequency::Weekly),
            other => Err(format!("unknown backup frequency '{other}'")),
        }
    }
}

/// Backup schedule of an instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupConfiguration {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub frequency: BackupFrequency,
    /// "HH:MM" in UTC, ignored for hourly schedules
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    7
}

impl Default for BackupConfiguration {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: BackupFrequency::default(),
            time_of_day: None,
            retention_days: default_retention_days(),
        }
    }
}

// ============================================================================
// Domains
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Verified,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DomainStatus::Pending => "pending",
            DomainStatus::Verified => "verified",
            DomainStatus::Failed => "failed",
            DomainStatus::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "domain")]
    pub name: String,
    pub status: DomainStatus,
    #[serde(default)]
    pub is_primary: bool,
    /// CNAME target the user must point the domain at
    #[serde(default)]
    pub dns_target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddDomainRequest {
    pub name: String,
}

// ============================================================================
// Collaborators
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    #[default]
    Write,
    Admin,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        })
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "admin" => Ok(Permission::Admin),
            other => Err(format!("unknown permission '{other}'")),
        }
    }
}

/// Git collaborator on an instance's repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collaborator {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddCollaboratorRequest {
    pub username: String,
    pub permission: Permission,
}

// ============================================================================
// Billing
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub plan_id: String,
    #[serde(default)]
    pub plan_name: Option<String>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPlan {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub price_cents: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_billing_interval")]
    pub interval: String,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_billing_interval() -> String {
    "month".to_string()
}

impl SubscriptionPlan {
    /// Price like "12.50 USD/month"
    pub fn price_label(&self) -> String {
        format!(
            "{}.{:02} {}/{}",
            self.price_cents / 100,
            self.price_cents % 100,
            self.currency.to_uppercase(),
            self.interval
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    pub plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

// ============================================================================
// Support tickets
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Pending,
    Closed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Closed => "closed",
            TicketStatus::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketMessage {
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelpTicket {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub subject: String,
    pub status: TicketStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenTicketRequest {
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketReplyRequest {
    pub body: String,
}
