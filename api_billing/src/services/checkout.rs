use common::env_config::Config;
use common::error::{AppError, Res};
use db::models::plan::PlanKey;
use db::models::user::User;
use sqlx::PgPool;
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client,
    CreateBillingPortalSession, CreateCheckoutSession, CustomerId,
};

use crate::dtos::billing::CheckoutRequest;

fn parse_customer_id(user: &User) -> Res<CustomerId> {
    let customer_id = user
        .customer_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("User has no billing customer yet".to_string()))?;
    customer_id
        .parse::<CustomerId>()
        .map_err(|e| AppError::Internal(format!("Invalid customer id: {}: {}", customer_id, e)))
}

/// Creates a hosted checkout session upgrading the user to a paid plan.
///
/// Only free-tier users go through checkout; for anyone already on a
/// paid plan the call is a no-op returning no url (plan changes happen
/// through the customer portal). The requested price resolves through
/// the fallback chain, so a missing interval/currency combination
/// degrades to the closest configured price instead of failing.
pub async fn create_checkout_session(
    client: &Client,
    pool: &PgPool,
    config: &Config,
    user: &User,
    req: CheckoutRequest,
) -> Res<Option<String>> {
    let customer_id = parse_customer_id(user)?;

    let current = db::subscription::get_subscription_by_user_id(pool, user.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("User has no subscription".to_string()))?;
    let current_plan = db::plan::get_plan_by_id(pool, current.plan_id).await?;
    if current_plan.key != PlanKey::Free.to_string() {
        return Ok(None);
    }

    let new_plan = db::plan::get_plan_by_id(pool, req.plan_id).await?;
    let resolved = new_plan
        .prices
        .resolve(req.interval, req.currency)
        .ok_or_else(|| {
            AppError::BadRequest(format!("No prices configured for plan '{}'", new_plan.name))
        })?;

    let success_url = format!("{}/dashboard/checkout", config.site_url);
    let cancel_url = format!("{}/dashboard/settings/billing", config.site_url);

    let params = CreateCheckoutSession {
        payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(resolved.stripe_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(success_url.as_str()),
        cancel_url: Some(cancel_url.as_str()),
        customer: Some(customer_id),
        ..Default::default()
    };

    let session = CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)?;

    Ok(session.url)
}

/// Creates a customer portal session for self-service billing
/// management, returning its url.
pub async fn create_customer_portal(
    client: &Client,
    config: &Config,
    user: &User,
) -> Res<String> {
    let customer_id = parse_customer_id(user)?;

    let return_url = format!("{}/dashboard/settings/billing", config.site_url);
    let mut params = CreateBillingPortalSession::new(customer_id);
    params.return_url = Some(return_url.as_str());

    let session = BillingPortalSession::create(client, params)
        .await
        .map_err(AppError::from)?;

    Ok(session.url)
}
