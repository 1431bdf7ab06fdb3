use serde::{Deserialize, Serialize};

use crate::db_types::{Order, UserServer};

/// Funds for an order have been captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// A server was created on the panel and is now active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProvisionedEvent {
    pub server: UserServer,
    pub order: Order,
}

impl ServerProvisionedEvent {
    pub fn new(server: UserServer, order: Order) -> Self {
        Self { server, order }
    }
}

/// A paid server could not be provisioned and has been returned to `pending`. Someone needs to look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningFailedEvent {
    pub server: UserServer,
    pub order: Order,
    pub reason: String,
}

impl ProvisioningFailedEvent {
    pub fn new(server: UserServer, order: Order, reason: String) -> Self {
        Self { server, order, reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    ServerProvisioned(ServerProvisionedEvent),
    ProvisioningFailed(ProvisioningFailedEvent),
}
