//! `SqliteDatabase` is the SQLite implementation of the storage traits in [`crate::traits`].
//!
//! Every trait method is a single statement on a pooled connection. The orchestrator sequences them, with external
//! calls in between, so there is nothing to gain from wrapping them in transactions here.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{db_url, new_pool, orders, plans, user_servers};
use crate::{
    db_types::{
        ActivatedServer,
        NewOrder,
        NewPlan,
        NewUserServer,
        Order,
        OrderStatusType,
        Plan,
        ProvisioningConfig,
        ServerStatus,
        UserServer,
    },
    traits::{CatalogStore, OrderManagement, ProvisioningConfigStore, ServerManagement, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogStore for SqliteDatabase {
    async fn fetch_plan(&self, plan_id: i64) -> Result<Option<Plan>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let plan = plans::fetch_plan(plan_id, &mut conn).await?;
        Ok(plan)
    }
}

impl ProvisioningConfigStore for SqliteDatabase {
    async fn fetch_provisioning_config(&self, plan_id: i64) -> Result<Option<ProvisioningConfig>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let config = plans::fetch_provisioning_config(plan_id, &mut conn).await?;
        Ok(config)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order #{} saved for gateway order {}", order.id, order.gateway_order_id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_for_user(&self, gateway_order_id: &str, user_id: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_user(gateway_order_id, user_id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_order_paid(&self, order_id: i64, capture_id: Option<String>) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::mark_order_paid(order_id, capture_id, &mut conn).await?;
        match &order {
            Some(_) => debug!("🗃️ Order #{order_id} marked as paid"),
            None => debug!("🗃️ Order #{order_id} was not pending. Left unchanged"),
        }
        Ok(order)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order #{order_id}")))?;
        debug!("🗃️ Order #{order_id} is now {status}");
        Ok(order)
    }

    async fn link_order_to_server(&self, order_id: i64, user_server_id: i64) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::link_order_to_server(order_id, user_server_id, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order #{order_id}")))?;
        trace!("🗃️ Order #{order_id} linked to server {user_server_id}");
        Ok(order)
    }

    async fn fetch_latest_order_for_server(&self, user_server_id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_latest_order_for_server(user_server_id, &mut conn).await?;
        Ok(order)
    }
}

impl ServerManagement for SqliteDatabase {
    async fn insert_user_server(&self, server: NewUserServer) -> Result<UserServer, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::insert_user_server(server, &mut conn).await?;
        debug!("🗃️ Pending server {} ({}) saved for {}", server.id, server.name, server.user_id);
        Ok(server)
    }

    async fn fetch_user_server(&self, id: i64) -> Result<Option<UserServer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::fetch_user_server(id, &mut conn).await?;
        Ok(server)
    }

    async fn fetch_latest_pending_server(
        &self,
        user_id: &str,
        plan_id: i64,
    ) -> Result<Option<UserServer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::fetch_latest_pending_server(user_id, plan_id, &mut conn).await?;
        Ok(server)
    }

    async fn fetch_servers_for_user(&self, user_id: &str) -> Result<Vec<UserServer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let servers = user_servers::fetch_servers_for_user(user_id, &mut conn).await?;
        Ok(servers)
    }

    async fn update_server_status(&self, id: i64, status: ServerStatus) -> Result<UserServer, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::update_server_status(id, status, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Server {id}")))?;
        debug!("🗃️ Server {id} is now {status}");
        Ok(server)
    }

    async fn start_provisioning(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let claimed = user_servers::start_provisioning(id, &mut conn).await?;
        Ok(claimed)
    }

    async fn activate_server(&self, id: i64, activation: ActivatedServer) -> Result<UserServer, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::activate_server(id, activation, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Server {id}")))?;
        debug!("🗃️ Server {id} is active until {:?}", server.expires_at);
        Ok(server)
    }

    async fn extend_server_expiry(&self, id: i64, expires_at: DateTime<Utc>) -> Result<UserServer, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let server = user_servers::extend_server_expiry(id, expires_at, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Server {id}")))?;
        debug!("🗃️ Server {id} now expires at {expires_at}");
        Ok(server)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `HOSTING_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the database file behind `url` if it does not exist yet. Returns `true` if it was created.
    pub async fn create_if_missing(url: &str) -> Result<bool, StoreError> {
        if Sqlite::database_exists(url).await? {
            return Ok(false);
        }
        Sqlite::create_database(url).await?;
        info!("🗃️ Created new database at {url}");
        Ok(true)
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    //------------------------------------------   Catalog seeding  ------------------------------------------------

    pub async fn insert_plan(&self, plan: NewPlan) -> Result<Plan, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let plan = plans::insert_plan(plan, &mut conn).await?;
        debug!("🗃️ Plan #{} ({}) created at {}", plan.id, plan.name, plan.price);
        Ok(plan)
    }

    pub async fn set_plan_enabled(&self, plan_id: i64, enabled: bool) -> Result<Plan, StoreError> {
        let mut conn = self.pool.acquire().await?;
        plans::set_plan_enabled(plan_id, enabled, &mut conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Plan #{plan_id}")))
    }

    pub async fn upsert_provisioning_config(
        &self,
        config: ProvisioningConfig,
    ) -> Result<ProvisioningConfig, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let config = plans::upsert_provisioning_config(config, &mut conn).await?;
        debug!("🗃️ Provisioning config for plan #{} saved. Node {}", config.plan_id, config.node_id);
        Ok(config)
    }

    pub async fn fetch_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_gateway_id(gateway_order_id, &mut conn).await?;
        Ok(order)
    }
}
