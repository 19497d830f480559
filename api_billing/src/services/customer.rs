use common::error::{AppError, Res};
use db::dtos::subscription::SubscriptionCreateRequest;
use db::models::plan::{Currency, Interval, PlanKey};
use db::models::subscription::Subscription;
use db::models::user::User;
use sqlx::PgPool;
use stripe::{Client, CreateSubscriptionItems, CustomerId};
use uuid::Uuid;

/// Creates the Stripe billing identity for a user and puts them on the
/// free plan.
///
/// Idempotent: when the user already carries a customer id this is a
/// no-op and returns `None`. The customer id is only persisted after
/// the free subscription was created, so a failed bootstrap can be
/// retried.
pub async fn setup_customer(
    client: &Client,
    pool: &PgPool,
    user: &User,
    currency: Currency,
) -> Res<Option<User>> {
    if user.customer_id.is_some() {
        return Ok(None);
    }

    let customer =
        common::stripe::create_customer(client, &user.email, user.username.as_deref()).await?;

    create_free_subscription(client, pool, user.id, customer.id.as_str(), currency).await?;

    let updated = db::user::update_customer_id(pool, user.id, customer.id.as_str()).await?;
    Ok(Some(updated))
}

/// Subscribes a fresh customer to the free plan, preferring its yearly
/// price in the requested currency. Price lookup degrades through the
/// fallback chain instead of failing on an exact-match miss.
async fn create_free_subscription(
    client: &Client,
    pool: &PgPool,
    user_id: Uuid,
    customer_id: &str,
    currency: Currency,
) -> Res<Subscription> {
    let plan = db::plan::get_plan_by_key(pool, &PlanKey::Free.to_string())
        .await?
        .ok_or_else(|| AppError::Internal("Free plan is not synced yet".to_string()))?;

    let resolved = plan
        .prices
        .resolve(Interval::Year, currency)
        .ok_or_else(|| {
            AppError::Internal(format!("No prices configured for plan '{}'", plan.name))
        })?;

    if db::subscription::get_subscription_by_user_id(pool, user_id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "Subscription already exists".to_string(),
        ));
    }

    let customer_id = customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!("Invalid customer id: {}: {}", customer_id, e))
    })?;

    let mut params = stripe::CreateSubscription::new(customer_id);
    params.items = Some(vec![CreateSubscriptionItems {
        price: Some(resolved.stripe_id.clone()),
        quantity: Some(1),
        ..Default::default()
    }]);

    let subscription = stripe::Subscription::create(client, params)
        .await
        .map_err(AppError::from)?;

    let price_stripe_id = subscription
        .items
        .data
        .first()
        .and_then(|item| item.price.as_ref())
        .map(|price| price.id.to_string())
        .unwrap_or_else(|| resolved.stripe_id.clone());

    db::subscription::insert_subscription(
        pool,
        SubscriptionCreateRequest {
            user_id,
            plan_id: plan.id,
            price_stripe_id,
            stripe_id: subscription.id.to_string(),
            currency: resolved.currency.to_string(),
            interval: resolved.interval.to_string(),
            status: subscription.status.to_string(),
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
            cancel_at_period_end: subscription.cancel_at_period_end,
        },
    )
    .await
}

/// Cancels every Stripe subscription of a customer and deletes the
/// customer itself. Used when an account is deleted.
pub async fn cancel_and_delete_customer(client: &Client, customer_id: &str) -> Res<()> {
    let customer_id: CustomerId = customer_id.parse().map_err(|e| {
        AppError::Internal(format!("Invalid customer id: {}: {}", customer_id, e))
    })?;

    let subs = stripe::Subscription::list(
        client,
        &stripe::ListSubscriptions {
            customer: Some(customer_id.clone()),
            ..Default::default()
        },
    )
    .await
    .map_err(AppError::from)?;

    for s in subs.data {
        stripe::Subscription::cancel(client, &s.id, stripe::CancelSubscription::new())
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to cancel subscription {}: {}", s.id, e))
            })?;
    }

    stripe::Customer::delete(client, &customer_id)
        .await
        .map_err(|e| {
            AppError::Internal(format!("Failed to delete customer {}: {}", customer_id, e))
        })?;

    Ok(())
}
