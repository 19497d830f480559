use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::SubscriptionCreateRequest, models::subscription::Subscription,
};

pub async fn get_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_subscription_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_id: &str,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE stripe_id = $1")
        .bind(stripe_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionCreateRequest,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions
            (user_id, plan_id, price_stripe_id, stripe_id, currency, "interval",
             status, current_period_start, current_period_end, cancel_at_period_end)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.plan_id)
    .bind(data.price_stripe_id)
    .bind(data.stripe_id)
    .bind(data.currency)
    .bind(data.interval)
    .bind(data.status)
    .bind(data.current_period_start)
    .bind(data.current_period_end)
    .bind(data.cancel_at_period_end)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_cancel_at_period_end<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_id: &str,
    cancel_at_period_end: bool,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        "UPDATE subscriptions SET cancel_at_period_end = $1 WHERE stripe_id = $2 RETURNING *",
    )
    .bind(cancel_at_period_end)
    .bind(stripe_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_subscription_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_subscription_by_stripe_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_id: &str,
) -> Res<()> {
    sqlx::query("DELETE FROM subscriptions WHERE stripe_id = $1")
        .bind(stripe_id)
        .execute(executor)
        .await?;
    Ok(())
}
