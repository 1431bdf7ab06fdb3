use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewPlan, Plan, ProvisioningConfig};

pub async fn fetch_plan(plan_id: i64, conn: &mut SqliteConnection) -> Result<Option<Plan>, sqlx::Error> {
    let plan = sqlx::query_as("SELECT * FROM plans WHERE id = $1").bind(plan_id).fetch_optional(conn).await?;
    Ok(plan)
}

/// Plans are maintained by the admin console. This exists for seeding and tests.
pub async fn insert_plan(plan: NewPlan, conn: &mut SqliteConnection) -> Result<Plan, sqlx::Error> {
    let now = Utc::now();
    let plan = sqlx::query_as(
        r#"
            INSERT INTO plans (name, category, price, ram, cpu, storage, bandwidth, enabled, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(plan.name)
    .bind(plan.category)
    .bind(plan.price)
    .bind(plan.ram)
    .bind(plan.cpu)
    .bind(plan.storage)
    .bind(plan.bandwidth)
    .bind(plan.enabled)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(plan)
}

pub async fn set_plan_enabled(
    plan_id: i64,
    enabled: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Plan>, sqlx::Error> {
    let plan = sqlx::query_as("UPDATE plans SET enabled = $1, updated_at = $2 WHERE id = $3 RETURNING *")
        .bind(enabled)
        .bind(Utc::now())
        .bind(plan_id)
        .fetch_optional(conn)
        .await?;
    Ok(plan)
}

pub async fn fetch_provisioning_config(
    plan_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ProvisioningConfig>, sqlx::Error> {
    let config = sqlx::query_as("SELECT * FROM provisioning_configs WHERE plan_id = $1")
        .bind(plan_id)
        .fetch_optional(conn)
        .await?;
    Ok(config)
}

/// Replaces the plan's build configuration, if it has one.
pub async fn upsert_provisioning_config(
    config: ProvisioningConfig,
    conn: &mut SqliteConnection,
) -> Result<ProvisioningConfig, sqlx::Error> {
    let config = sqlx::query_as(
        r#"
            INSERT INTO provisioning_configs (
                plan_id,
                node_id,
                nest_id,
                egg_id,
                memory_mb,
                disk_mb,
                cpu_percent,
                databases,
                backups,
                allocations,
                docker_image,
                startup,
                environment
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (plan_id) DO UPDATE SET
                node_id = excluded.node_id,
                nest_id = excluded.nest_id,
                egg_id = excluded.egg_id,
                memory_mb = excluded.memory_mb,
                disk_mb = excluded.disk_mb,
                cpu_percent = excluded.cpu_percent,
                databases = excluded.databases,
                backups = excluded.backups,
                allocations = excluded.allocations,
                docker_image = excluded.docker_image,
                startup = excluded.startup,
                environment = excluded.environment
            RETURNING *;
        "#,
    )
    .bind(config.plan_id)
    .bind(config.node_id)
    .bind(config.nest_id)
    .bind(config.egg_id)
    .bind(config.memory_mb)
    .bind(config.disk_mb)
    .bind(config.cpu_percent)
    .bind(config.databases)
    .bind(config.backups)
    .bind(config.allocations)
    .bind(config.docker_image)
    .bind(config.startup)
    .bind(config.environment)
    .fetch_one(conn)
    .await?;
    Ok(config)
}
