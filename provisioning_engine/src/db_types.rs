use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Months, Utc};
use hosting_common::Money;
use serde::{Deserialize, Serialize};
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------     BillingCycle       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    #[serde(alias = "monthly")]
    Month,
    #[serde(alias = "quarterly")]
    Quarter,
    #[serde(alias = "yearly", alias = "annual")]
    Year,
}

impl BillingCycle {
    /// The number of months a single payment covers.
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Month => 1,
            BillingCycle::Quarter => 3,
            BillingCycle::Year => 12,
        }
    }

    pub fn multiplier(&self) -> i64 {
        i64::from(self.months())
    }

    /// Longer commitments are discounted: 10% off quarterly and 20% off yearly.
    pub fn discount_percent(&self) -> i64 {
        match self {
            BillingCycle::Month => 0,
            BillingCycle::Quarter => 10,
            BillingCycle::Year => 20,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillingCycle::Month => "Monthly",
            BillingCycle::Quarter => "Quarterly",
            BillingCycle::Year => "Yearly",
        }
    }

    /// Calendar-aware expiry. Month ends are clamped, so Jan 31 + 1 month is the last day of February.
    pub fn expiry_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start.checked_add_months(Months::new(self.months())).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingCycle::Month => write!(f, "month"),
            BillingCycle::Quarter => write!(f, "quarter"),
            BillingCycle::Year => write!(f, "year"),
        }
    }
}

impl FromStr for BillingCycle {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(Self::Month),
            "quarter" | "quarterly" => Ok(Self::Quarter),
            "year" | "yearly" | "annual" => Ok(Self::Year),
            s => Err(ConversionError(format!("Invalid billing cycle: {s}"))),
        }
    }
}

//--------------------------------------       OrderType        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// A purchase of a new server
    #[default]
    New,
    /// Extends the expiry of an existing server by another billing cycle
    Renew,
    /// Moves an existing server to a bigger plan
    Upgrade,
}

impl OrderType {
    /// Renewals and upgrades act on a server the customer already has.
    pub fn requires_existing_server(&self) -> bool {
        !matches!(self, OrderType::New)
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::New => write!(f, "new"),
            OrderType::Renew => write!(f, "renew"),
            OrderType::Upgrade => write!(f, "upgrade"),
        }
    }
}

impl FromStr for OrderType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "renew" => Ok(Self::Renew),
            "upgrade" => Ok(Self::Upgrade),
            s => Err(ConversionError(format!("Invalid order type: {s}"))),
        }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The payment gateway order exists, but no money has moved yet
    #[default]
    Pending,
    /// Funds have been captured
    Paid,
    /// Funds have been captured and the order has been fulfilled
    Active,
    Failed,
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Active => write!(f, "active"),
            OrderStatusType::Failed => write!(f, "failed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "active" => Ok(Self::Active),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     ServerStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Waiting for payment, or paid and waiting for (another) provisioning attempt
    #[default]
    Pending,
    /// A provisioning attempt is in flight
    Provisioning,
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Pending => write!(f, "pending"),
            ServerStatus::Provisioning => write!(f, "provisioning"),
            ServerStatus::Active => write!(f, "active"),
            ServerStatus::Expired => write!(f, "expired"),
            ServerStatus::Suspended => write!(f, "suspended"),
            ServerStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for ServerStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "provisioning" => Ok(Self::Provisioning),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "suspended" => Ok(Self::Suspended),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid server status: {s}"))),
        }
    }
}

//--------------------------------------         Plan           ---------------------------------------------------------
/// A hosting plan from the catalog. Plans are managed by the admin console and are read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// The price of one billing unit (one month)
    pub price: Money,
    pub billing_cycle: BillingCycle,
    pub ram: String,
    pub cpu: String,
    pub storage: String,
    pub bandwidth: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub category: String,
    pub price: Money,
    pub ram: String,
    pub cpu: String,
    pub storage: String,
    pub bandwidth: String,
    pub enabled: bool,
}

impl NewPlan {
    pub fn new<S: Into<String>>(name: S, price: Money) -> Self {
        Self {
            name: name.into(),
            category: "minecraft".to_string(),
            price,
            ram: String::default(),
            cpu: String::default(),
            storage: String::default(),
            bandwidth: "Unmetered".to_string(),
            enabled: true,
        }
    }
}

//--------------------------------------  ProvisioningConfig   ---------------------------------------------------------
/// The panel parameters used to build a server for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProvisioningConfig {
    pub plan_id: i64,
    pub node_id: i64,
    pub nest_id: i64,
    pub egg_id: i64,
    pub memory_mb: i64,
    pub disk_mb: i64,
    /// Percent of a single core. May exceed 100.
    pub cpu_percent: i64,
    pub databases: i64,
    pub backups: i64,
    pub allocations: i64,
    /// Overrides the egg's default image when set
    pub docker_image: Option<String>,
    /// Overrides the egg's default startup command when set
    pub startup: Option<String>,
    /// Merged over the egg's variable defaults
    pub environment: Option<Json<HashMap<String, String>>>,
}

impl ProvisioningConfig {
    pub fn environment(&self) -> HashMap<String, String> {
        self.environment.as_ref().map(|j| j.0.clone()).unwrap_or_default()
    }
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub plan_id: i64,
    pub order_type: OrderType,
    /// The amount actually charged, after any discount
    pub amount: Money,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    /// The payment gateway's order id. Unique, and the key used to find the order at capture time.
    pub gateway_order_id: String,
    /// Set once the payment gateway has settled the payment
    pub capture_id: Option<String>,
    pub status: OrderStatusType,
    pub user_server_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: String,
    pub plan_id: i64,
    pub order_type: OrderType,
    pub amount: Money,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub gateway_order_id: String,
    /// Only set for renewals and upgrades, which name the server they apply to
    pub user_server_id: Option<i64>,
}

//--------------------------------------      UserServer       ---------------------------------------------------------
/// A customer's server, whether or not it exists on the panel yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserServer {
    pub id: i64,
    pub user_id: String,
    pub plan_id: i64,
    pub name: String,
    pub panel_email: String,
    pub panel_username: Option<String>,
    pub panel_user_id: Option<i64>,
    pub panel_server_id: Option<i64>,
    /// The short id the panel uses in URLs
    pub panel_server_identifier: Option<String>,
    pub status: ServerStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserServer {
    pub user_id: String,
    pub plan_id: i64,
    pub name: String,
    pub panel_email: String,
}

/// The panel-side identifiers recorded on a server once provisioning succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedServer {
    pub panel_user_id: i64,
    pub panel_username: String,
    pub panel_server_id: i64,
    pub panel_server_identifier: String,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------        Caller         ---------------------------------------------------------
/// The authenticated customer on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub email: String,
}

impl Caller {
    pub fn new<S: Into<String>, E: Into<String>>(user_id: S, email: E) -> Self {
        Self { user_id: user_id.into(), email: email.into() }
    }
}
