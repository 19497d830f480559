use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services;

/// Stripe webhook endpoint. Unauthenticated; trust comes from the
/// signature check against the configured webhook secret.
#[post("/webhook")]
pub async fn post_webhook(
    req: HttpRequest,
    payload: String,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let signature = req
        .headers()
        .get("Stripe-Signature")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let event =
        services::webhook::construct_event(&payload, signature, &config.stripe_webhook_secret)?;
    services::webhook::process_event(&pool, event).await?;

    Success::ok(serde_json::json!({ "received": true }))
}
