use chrono::{DateTime, Utc};

use crate::{
    db_types::{ActivatedServer, NewUserServer, ServerStatus, UserServer},
    traits::StoreError,
};

/// Storage for customer server records.
#[allow(async_fn_in_trait)]
pub trait ServerManagement {
    /// Stores a new server record with status `pending`.
    async fn insert_user_server(&self, server: NewUserServer) -> Result<UserServer, StoreError>;

    async fn fetch_user_server(&self, id: i64) -> Result<Option<UserServer>, StoreError>;

    /// The most recently created `pending` server for the user and plan. Ties on creation time go to the higher id.
    async fn fetch_latest_pending_server(&self, user_id: &str, plan_id: i64)
        -> Result<Option<UserServer>, StoreError>;

    /// All the user's servers, newest first.
    async fn fetch_servers_for_user(&self, user_id: &str) -> Result<Vec<UserServer>, StoreError>;

    async fn update_server_status(&self, id: i64, status: ServerStatus) -> Result<UserServer, StoreError>;

    /// Moves the server from `pending` to `provisioning`. Returns `false`, and changes nothing, if the server was not
    /// `pending`. This is what stops two flows from provisioning the same server.
    async fn start_provisioning(&self, id: i64) -> Result<bool, StoreError>;

    /// Records the panel identifiers and expiry, and sets the status to `active`.
    async fn activate_server(&self, id: i64, activation: ActivatedServer) -> Result<UserServer, StoreError>;

    async fn extend_server_expiry(&self, id: i64, expires_at: DateTime<Utc>) -> Result<UserServer, StoreError>;
}
