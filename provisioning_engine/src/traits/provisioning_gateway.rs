use thiserror::Error;

use crate::db_types::ProvisioningConfig;

#[derive(Debug, Clone, Error)]
pub enum ProvisioningGatewayError {
    /// The panel answered with a non-success status. 4xx means the request itself was bad; 5xx may succeed later.
    #[error("The panel returned error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Could not reach the panel: {0}")]
    Transport(String),
    #[error("The panel sent a response we could not understand: {0}")]
    MalformedResponse(String),
}

impl ProvisioningGatewayError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::Transport(_) => true,
            Self::MalformedResponse(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPanelAccount {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelAllocation {
    pub id: i64,
    /// `host:port`, for display
    pub address: String,
}

/// Everything needed to create one server on the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    pub name: String,
    pub panel_user_id: i64,
    pub allocation_id: i64,
    pub config: ProvisioningConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelInstance {
    pub id: i64,
    /// The short id used in panel URLs
    pub identifier: String,
}

/// The panel calls the provisioning flow depends on.
///
/// None of these calls are retried. The panel is the final arbiter of whether an allocation is still free: a
/// `create_instance` that loses a race for an allocation fails, and the failure is reported, not retried.
#[allow(async_fn_in_trait)]
pub trait ProvisioningGateway {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<PanelAccount>, ProvisioningGatewayError>;

    async fn create_account(&self, account: NewPanelAccount) -> Result<PanelAccount, ProvisioningGatewayError>;

    /// The first unassigned allocation on the node, or `None` when the node is full.
    async fn find_free_allocation(&self, node_id: i64) -> Result<Option<PanelAllocation>, ProvisioningGatewayError>;

    async fn create_instance(&self, spec: InstanceSpec) -> Result<PanelInstance, ProvisioningGatewayError>;

    /// The customer-facing console link for a server.
    fn server_url(&self, identifier: &str) -> String;
}
