use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{ActivatedServer, NewUserServer, ServerStatus, UserServer};

pub async fn insert_user_server(server: NewUserServer, conn: &mut SqliteConnection) -> Result<UserServer, sqlx::Error> {
    let now = Utc::now();
    let server = sqlx::query_as(
        r#"
            INSERT INTO user_servers (user_id, plan_id, name, panel_email, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $5)
            RETURNING *;
        "#,
    )
    .bind(server.user_id)
    .bind(server.plan_id)
    .bind(server.name)
    .bind(server.panel_email)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(server)
}

pub async fn fetch_user_server(id: i64, conn: &mut SqliteConnection) -> Result<Option<UserServer>, sqlx::Error> {
    let server = sqlx::query_as("SELECT * FROM user_servers WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(server)
}

pub async fn fetch_latest_pending_server(
    user_id: &str,
    plan_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserServer>, sqlx::Error> {
    let server = sqlx::query_as(
        r#"
            SELECT * FROM user_servers
            WHERE user_id = $1 AND plan_id = $2 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(plan_id)
    .fetch_optional(conn)
    .await?;
    Ok(server)
}

pub async fn fetch_servers_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<UserServer>, sqlx::Error> {
    let servers = sqlx::query_as("SELECT * FROM user_servers WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(servers)
}

pub async fn update_server_status(
    id: i64,
    status: ServerStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<UserServer>, sqlx::Error> {
    let server = sqlx::query_as("UPDATE user_servers SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(server)
}

/// A conditional update, so only one caller can move a given server out of `pending`.
pub async fn start_provisioning(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE user_servers SET status = 'provisioning', updated_at = $1 WHERE id = $2 AND status = 'pending'",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(conn)
    .await?;
    trace!("🗃️ start_provisioning on server {id} affected {} rows", result.rows_affected());
    Ok(result.rows_affected() == 1)
}

pub async fn activate_server(
    id: i64,
    activation: ActivatedServer,
    conn: &mut SqliteConnection,
) -> Result<Option<UserServer>, sqlx::Error> {
    let server = sqlx::query_as(
        r#"
            UPDATE user_servers SET
                panel_user_id = $1,
                panel_username = $2,
                panel_server_id = $3,
                panel_server_identifier = $4,
                expires_at = $5,
                status = 'active',
                updated_at = $6
            WHERE id = $7
            RETURNING *;
        "#,
    )
    .bind(activation.panel_user_id)
    .bind(activation.panel_username)
    .bind(activation.panel_server_id)
    .bind(activation.panel_server_identifier)
    .bind(activation.expires_at)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(server)
}

/// Sets a new expiry. A server that had lapsed into `expired` becomes `active` again.
pub async fn extend_server_expiry(
    id: i64,
    expires_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<UserServer>, sqlx::Error> {
    let server = sqlx::query_as(
        r#"
            UPDATE user_servers SET
                expires_at = $1,
                status = CASE WHEN status = 'expired' THEN 'active' ELSE status END,
                updated_at = $2
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(expires_at)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(server)
}
