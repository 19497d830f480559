use common::error::{AppError, Res};
use sqlx::types::Json;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::plan::PlanUpsertRequest, models::plan::Plan};

pub async fn get_plans<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<Vec<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY key")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_plan_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(plan_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))
}

pub async fn get_plan_by_key<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    key: &str,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE key = $1")
        .bind(key)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_plan_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_id: &str,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE stripe_id = $1")
        .bind(stripe_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Inserts the plan, or refreshes it when a row for the same Stripe
/// product already exists. Used by the catalog sync.
pub async fn upsert_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: PlanUpsertRequest,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>(
        r#"
        INSERT INTO plans (key, stripe_id, name, description, prices)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (stripe_id) DO UPDATE
        SET key = EXCLUDED.key,
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            prices = EXCLUDED.prices
        RETURNING *
        "#,
    )
    .bind(data.key)
    .bind(data.stripe_id)
    .bind(data.name)
    .bind(data.description)
    .bind(Json(data.prices))
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
