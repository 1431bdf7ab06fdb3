//! Provisioning Engine
//!
//! The provisioning engine turns a paid order for a game-server plan into a running server on the hosting panel.
//! It is provider-agnostic: the database, the payment gateway and the panel are all reached through the traits in
//! [`mod@traits`].
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`] and, with the `sqlite` feature, [`SqliteDatabase`]). The data types stored are defined
//!    in [`mod@db_types`] and are public.
//! 2. The public API ([`OrderFlowApi`]), which creates checkouts, captures payments and provisions servers.
//! 3. Events ([`mod@events`]). The engine publishes an event when an order is paid, when a server goes live and when
//!    provisioning fails. Hook into these to send emails or alert an operator.
pub mod db_types;
pub mod events;
pub mod helpers;
mod pe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use pe_api::{
    errors::{OrderFlowError, ProvisioningError},
    order_flow_api::OrderFlowApi,
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    CatalogStore,
    HostingDatabase,
    OrderManagement,
    PaymentGateway,
    ProvisioningConfigStore,
    ProvisioningGateway,
    ServerManagement,
    StoreError,
};
