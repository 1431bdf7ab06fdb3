use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    traits::StoreError,
};

/// The `OrderManagement` trait defines the behaviour for storing orders and moving them through their lifecycle.
///
/// Every method is a single-row write or read. Callers must not assume that two calls are applied atomically.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order with status `pending`. The gateway order id must be unique; a second order with the same
    /// gateway id fails with [`StoreError::Duplicate`].
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetches an order by our own id.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;

    /// Fetches the order with the given payment gateway id, but only if it belongs to `user_id`.
    async fn fetch_order_for_user(&self, gateway_order_id: &str, user_id: &str) -> Result<Option<Order>, StoreError>;

    /// Records the settlement of an order: sets the status to `paid` and stores the gateway's capture id.
    ///
    /// Only a `pending` order is changed. `None` means the order was no longer pending (or does not exist), typically
    /// because a concurrent capture settled it first.
    async fn mark_order_paid(&self, order_id: i64, capture_id: Option<String>) -> Result<Option<Order>, StoreError>;

    async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, StoreError>;

    async fn link_order_to_server(&self, order_id: i64, user_server_id: i64) -> Result<Order, StoreError>;

    /// The most recently created order linked to the given server, if any.
    async fn fetch_latest_order_for_server(&self, user_server_id: i64) -> Result<Option<Order>, StoreError>;
}
