use common::error::{AppError, Res};
use db::dtos::subscription::SubscriptionCreateRequest;
use db::models::subscription::Subscription;
use sqlx::PgPool;
use stripe::Client;
use uuid::Uuid;

use crate::dtos::billing::SubscriptionView;

/// Gets the user's subscription together with its plan key.
/// Returns None for users that have not been onboarded yet.
pub async fn get_current_subscription(
    pool: &PgPool,
    user_id: Uuid,
) -> Res<Option<SubscriptionView>> {
    let Some(subscription) = db::subscription::get_subscription_by_user_id(pool, user_id).await?
    else {
        return Ok(None);
    };

    let plan = db::plan::get_plan_by_id(pool, subscription.plan_id).await?;

    Ok(Some(SubscriptionView {
        plan_key: plan.key,
        plan_name: plan.name,
        subscription,
    }))
}

/// Replaces the user's subscription record with a new one.
/// Delete-then-insert runs inside a single transaction so the
/// one-subscription-per-user invariant holds at every commit point.
pub async fn replace_subscription(
    pool: &PgPool,
    user_id: Uuid,
    data: SubscriptionCreateRequest,
) -> Res<Subscription> {
    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let existing = db::subscription::get_subscription_by_user_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription to replace".to_string()))?;

    db::subscription::delete_subscription_by_id(&mut *tx, existing.id).await?;
    let inserted = db::subscription::insert_subscription(&mut *tx, data).await?;

    tx.commit().await.map_err(AppError::from)?;
    Ok(inserted)
}

/// Update if the given user's subscription should be renewed.
/// Stripe speaks in `cancel_at_period_end`, the dashboard in
/// `auto_renew`; the two are each other's negation.
pub async fn set_auto_renew(
    client: &Client,
    pool: &PgPool,
    user_id: Uuid,
    auto_renew: bool,
) -> Res<Subscription> {
    let subscription = db::subscription::get_subscription_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found".to_string()))?;

    let sub_id = subscription
        .stripe_id
        .parse::<stripe::SubscriptionId>()
        .map_err(|e| AppError::BadRequest(format!("Invalid subscription ID: {}", e)))?;

    let cancel_at_period_end = !auto_renew;

    stripe::Subscription::update(
        client,
        &sub_id,
        stripe::UpdateSubscription {
            cancel_at_period_end: Some(cancel_at_period_end),
            ..Default::default()
        },
    )
    .await
    .map_err(AppError::from)?;

    db::subscription::update_cancel_at_period_end(
        pool,
        &subscription.stripe_id,
        cancel_at_period_end,
    )
    .await
}
