//! # Interface contracts
//!
//! The orchestrator in [`crate::OrderFlowApi`] never talks to a database, PayPal or the panel directly. It works
//! against the traits in this module, so that each collaborator can be swapped for a fake in tests.
//!
//! ## Storage
//! * [`CatalogStore`] reads hosting plans. Plans are owned by the admin console.
//! * [`ProvisioningConfigStore`] reads the panel build parameters of a plan.
//! * [`OrderManagement`] stores orders and their status transitions.
//! * [`ServerManagement`] stores customer server records and their status transitions.
//! * [`HostingDatabase`] is the combination of all four, and is what [`crate::SqliteDatabase`] provides.
//!
//! ## External services
//! * [`PaymentGateway`] creates payable orders and captures them.
//! * [`ProvisioningGateway`] finds or creates panel accounts, picks allocations and creates servers.
mod catalog;
mod order_management;
mod payment_gateway;
mod provisioning_gateway;
mod server_management;
mod store_error;

pub use catalog::{CatalogStore, ProvisioningConfigStore};
pub use order_management::OrderManagement;
pub use payment_gateway::{CaptureReceipt, PayableOrder, PayableOrderCreated, PaymentGateway, PaymentGatewayError};
pub use provisioning_gateway::{
    InstanceSpec,
    NewPanelAccount,
    PanelAccount,
    PanelAllocation,
    PanelInstance,
    ProvisioningGateway,
    ProvisioningGatewayError,
};
pub use server_management::ServerManagement;
pub use store_error::StoreError;

/// Everything the orchestrator needs from persistent storage.
pub trait HostingDatabase: CatalogStore + ProvisioningConfigStore + OrderManagement + ServerManagement {}

impl<T> HostingDatabase for T where T: CatalogStore + ProvisioningConfigStore + OrderManagement + ServerManagement {}
