use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{
    dtos::billing::{AutoRenewRequest, CheckoutRequest, CheckoutResponse, PortalResponse},
    services,
};

/// Lists the locally mirrored billing plans.
#[get("/plans")]
pub async fn get_plans(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let plans = db::plan::get_plans(&***pool).await?;
    Success::ok(plans)
}

/// Gets the caller's subscription with its plan key, or null when the
/// user has not been onboarded yet.
#[get("/subscription")]
pub async fn get_subscription(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let subscription =
        services::subscription::get_current_subscription(&pool, claims.user_id).await?;
    Success::ok(subscription)
}

/// Starts a hosted checkout for a plan upgrade.
#[post("/checkout")]
pub async fn post_checkout(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    req: web::Json<CheckoutRequest>,
) -> Res<impl Responder> {
    let user = db::user::get_user_by_id(&***pool, claims.user_id).await?;
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let url =
        services::checkout::create_checkout_session(&client, &pool, &config, &user, req.into_inner())
            .await?;
    Success::ok(CheckoutResponse { url })
}

/// Hands the user off to the Stripe customer portal.
#[post("/portal")]
pub async fn post_portal(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let user = db::user::get_user_by_id(&***pool, claims.user_id).await?;
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let url = services::checkout::create_customer_portal(&client, &config, &user).await?;
    Success::ok(PortalResponse { url })
}

/// Toggles renewal of the caller's subscription.
#[post("/auto-renew")]
pub async fn post_auto_renew(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    req: web::Json<AutoRenewRequest>,
) -> Res<impl Responder> {
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let subscription =
        services::subscription::set_auto_renew(&client, &pool, claims.user_id, req.auto_renew)
            .await?;
    Success::ok(subscription)
}

/// Re-syncs the plan catalog from Stripe on demand.
#[post("/sync")]
pub async fn post_sync(
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let plans = services::catalog::sync_plans(&client, &pool).await?;
    Success::ok(plans)
}
