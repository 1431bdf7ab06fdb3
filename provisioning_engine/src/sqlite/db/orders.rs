use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderStatusType};

/// Inserts a new order with status `pending`. Fails with a unique violation if the gateway order id is already
/// known.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                plan_id,
                order_type,
                amount,
                currency,
                billing_cycle,
                gateway_order_id,
                status,
                user_server_id,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.plan_id)
    .bind(order.order_type)
    .bind(order.amount)
    .bind(order.currency)
    .bind(order.billing_cycle)
    .bind(order.gateway_order_id)
    .bind(order.user_server_id)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_gateway_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Returns the order only if it belongs to `user_id`. Another user's order is indistinguishable from a missing one.
pub async fn fetch_order_for_user(
    gateway_order_id: &str,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1 AND user_id = $2")
        .bind(gateway_order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Moves a `pending` order to `paid`. Returns `None` if the order is missing or no longer pending.
pub async fn mark_order_paid(
    id: i64,
    capture_id: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = 'paid', capture_id = COALESCE($1, capture_id), updated_at = $2 WHERE id = $3 AND \
         status = 'pending' RETURNING *",
    )
    .bind(capture_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn link_order_to_server(
    id: i64,
    user_server_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET user_server_id = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(user_server_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_latest_order_for_server(
    user_server_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE user_server_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1")
            .bind(user_server_id)
            .fetch_optional(conn)
            .await?;
    Ok(order)
}
