use common::error::{AppError, Res};
use db::dtos::subscription::SubscriptionCreateRequest;
use sqlx::PgPool;
use stripe::{Event, EventObject, EventType, Expandable, Webhook};

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// The fields we mirror from a Stripe subscription object.
struct SubscriptionSnapshot {
    stripe_id: String,
    customer_id: String,
    product_stripe_id: String,
    price_stripe_id: String,
    currency: String,
    interval: String,
    status: String,
    current_period_start: i64,
    current_period_end: i64,
    cancel_at_period_end: bool,
}

fn snapshot(subscription: &stripe::Subscription) -> Res<SubscriptionSnapshot> {
    let item = subscription
        .items
        .data
        .first()
        .ok_or_else(|| AppError::BadRequest("Subscription event carries no items".to_string()))?;
    let price = item
        .price
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Subscription item carries no price".to_string()))?;

    let product_stripe_id = match &price.product {
        Some(Expandable::Id(id)) => id.to_string(),
        Some(Expandable::Object(product)) => product.id.to_string(),
        None => {
            return Err(AppError::BadRequest(
                "Subscription price carries no product".to_string(),
            ));
        }
    };

    let customer_id = match &subscription.customer {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(customer) => customer.id.to_string(),
    };

    let interval = price
        .recurring
        .as_ref()
        .map(|recurring| recurring.interval.to_string())
        .ok_or_else(|| AppError::BadRequest("Subscription price is not recurring".to_string()))?;

    let currency = price
        .currency
        .map(|currency| currency.to_string())
        .unwrap_or_else(|| "usd".to_string());

    Ok(SubscriptionSnapshot {
        stripe_id: subscription.id.to_string(),
        customer_id,
        product_stripe_id,
        price_stripe_id: price.id.to_string(),
        currency,
        interval,
        status: subscription.status.to_string(),
        current_period_start: subscription.current_period_start,
        current_period_end: subscription.current_period_end,
        cancel_at_period_end: subscription.cancel_at_period_end,
    })
}

/// Reconciles one webhook event into the local subscription records.
///
/// `customer.subscription.updated` replaces the user's record with the
/// provider's current state; `customer.subscription.deleted` removes
/// it. Everything else is logged and ignored.
pub async fn process_event(pool: &PgPool, event: Event) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match event.type_ {
        EventType::CustomerSubscriptionUpdated => {
            if let EventObject::Subscription(subscription) = event.data.object {
                apply_subscription_update(pool, &subscription).await?;
            }
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                log::info!("Subscription deleted: {}", subscription.id);
                db::subscription::delete_subscription_by_stripe_id(
                    pool,
                    subscription.id.as_str(),
                )
                .await?;
            }
        }
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                // the subscription.updated event carries the data we mirror
                log::info!("Checkout session completed: {}", session.id);
            }
        }
        _ => {
            log::info!("Unhandled event type: {}", event.type_);
        }
    }

    Ok(())
}

async fn apply_subscription_update(
    pool: &PgPool,
    subscription: &stripe::Subscription,
) -> Res<()> {
    let snap = snapshot(subscription)?;

    let user = db::user::get_user_by_customer_id(pool, &snap.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No user for customer {}", snap.customer_id))
        })?;

    let plan = db::plan::get_plan_by_stripe_id(pool, &snap.product_stripe_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No plan for product {}", snap.product_stripe_id))
        })?;

    super::subscription::replace_subscription(
        pool,
        user.id,
        SubscriptionCreateRequest {
            user_id: user.id,
            plan_id: plan.id,
            price_stripe_id: snap.price_stripe_id,
            stripe_id: snap.stripe_id,
            currency: snap.currency,
            interval: snap.interval,
            status: snap.status,
            current_period_start: snap.current_period_start,
            current_period_end: snap.current_period_end,
            cancel_at_period_end: snap.cancel_at_period_end,
        },
    )
    .await?;

    log::info!("Subscription replaced for user {}", user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // trimmed-down subscription payload as the API returns it
    const SUBSCRIPTION_JSON: &str = r#"{
        "id": "sub_1MowQVLkdIwHu7ixeRlqHVzs",
        "object": "subscription",
        "application": null,
        "application_fee_percent": null,
        "automatic_tax": {"enabled": false, "liability": null},
        "billing_cycle_anchor": 1679609767,
        "billing_thresholds": null,
        "cancel_at": null,
        "cancel_at_period_end": true,
        "canceled_at": null,
        "cancellation_details": null,
        "collection_method": "charge_automatically",
        "created": 1679609767,
        "currency": "usd",
        "current_period_end": 1682288167,
        "current_period_start": 1679609767,
        "customer": "cus_Na6dX7aXxi11N4",
        "days_until_due": null,
        "default_payment_method": null,
        "default_source": null,
        "default_tax_rates": [],
        "description": null,
        "discount": null,
        "ended_at": null,
        "items": {
            "object": "list",
            "data": [
                {
                    "id": "si_Na6dzxczY5fwHx",
                    "object": "subscription_item",
                    "billing_thresholds": null,
                    "created": 1679609768,
                    "metadata": {},
                    "price": {
                        "id": "price_1MowQULkdIwHu7ixraBm864M",
                        "object": "price",
                        "active": true,
                        "billing_scheme": "per_unit",
                        "created": 1679609766,
                        "currency": "usd",
                        "custom_unit_amount": null,
                        "livemode": false,
                        "lookup_key": null,
                        "metadata": {},
                        "nickname": null,
                        "product": "prod_Na6dGcTsmU0I4R",
                        "recurring": {
                            "aggregate_usage": null,
                            "interval": "month",
                            "interval_count": 1,
                            "usage_type": "licensed"
                        },
                        "tax_behavior": null,
                        "tiers_mode": null,
                        "transform_quantity": null,
                        "type": "recurring",
                        "unit_amount": 1000,
                        "unit_amount_decimal": "1000"
                    },
                    "quantity": 1,
                    "subscription": "sub_1MowQVLkdIwHu7ixeRlqHVzs",
                    "tax_rates": []
                }
            ],
            "has_more": false,
            "total_count": 1,
            "url": "/v1/subscription_items?subscription=sub_1MowQVLkdIwHu7ixeRlqHVzs"
        },
        "latest_invoice": null,
        "livemode": false,
        "metadata": {},
        "next_pending_invoice_item_invoice": null,
        "on_behalf_of": null,
        "pause_collection": null,
        "payment_settings": null,
        "pending_invoice_item_interval": null,
        "pending_setup_intent": null,
        "pending_update": null,
        "schedule": null,
        "start_date": 1679609767,
        "status": "active",
        "test_clock": null,
        "transfer_data": null,
        "trial_end": null,
        "trial_settings": null,
        "trial_start": null
    }"#;

    fn subscription_fixture() -> stripe::Subscription {
        serde_json::from_str(SUBSCRIPTION_JSON).unwrap()
    }

    #[test]
    fn snapshot_maps_subscription_fields() {
        let subscription = subscription_fixture();
        let snap = snapshot(&subscription).unwrap();

        assert_eq!(snap.stripe_id, "sub_1MowQVLkdIwHu7ixeRlqHVzs");
        assert_eq!(snap.customer_id, "cus_Na6dX7aXxi11N4");
        assert_eq!(snap.product_stripe_id, "prod_Na6dGcTsmU0I4R");
        assert_eq!(snap.price_stripe_id, "price_1MowQULkdIwHu7ixraBm864M");
        assert_eq!(snap.currency, "usd");
        assert_eq!(snap.interval, "month");
        assert_eq!(snap.status, "active");
        assert_eq!(snap.current_period_start, 1679609767);
        assert_eq!(snap.current_period_end, 1682288167);
        assert!(snap.cancel_at_period_end);
    }

    #[test]
    fn snapshot_rejects_subscription_without_items() {
        let mut subscription = subscription_fixture();
        subscription.items.data.clear();

        assert!(snapshot(&subscription).is_err());
    }

    #[test]
    fn snapshot_rejects_non_recurring_price() {
        let mut subscription = subscription_fixture();
        subscription.items.data[0].price.as_mut().unwrap().recurring = None;

        assert!(snapshot(&subscription).is_err());
    }
}
