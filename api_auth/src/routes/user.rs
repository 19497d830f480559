use std::sync::Arc;

use actix_web::{Responder, delete, get, post, put, web};
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::dtos::user::{OnboardingRequest, UpdateImageRequest, UpdateUsernameRequest};
use crate::services;

/// Retrieves the current authenticated user's profile, including the
/// subscription with its plan key when one exists.
#[get("/me")]
pub async fn get_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let profile = services::user::get_profile(&pool, claims.user_id).await?;
    Success::ok(profile)
}

/// Updates the authenticated user's username.
#[put("/username")]
pub async fn put_username(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    req: web::Json<UpdateUsernameRequest>,
) -> Res<impl Responder> {
    let user = db::user::update_username(&***pool, claims.user_id, &req.username).await?;
    Success::ok(user)
}

/// Completes onboarding: sets the username and creates the billing
/// identity (customer plus free subscription) when missing.
#[post("/onboarding")]
pub async fn post_onboarding(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
    req: web::Json<OnboardingRequest>,
) -> Res<impl Responder> {
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let profile =
        services::user::complete_onboarding(&client, &pool, claims.user_id, req.into_inner())
            .await?;
    Success::ok(profile)
}

/// Sets the authenticated user's avatar image reference.
#[put("/image")]
pub async fn put_image(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    req: web::Json<UpdateImageRequest>,
) -> Res<impl Responder> {
    let user =
        db::user::update_image_url(&***pool, claims.user_id, Some(req.image_url.as_str())).await?;
    Success::ok(user)
}

/// Clears the authenticated user's avatar image reference.
#[delete("/image")]
pub async fn delete_image(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let user = db::user::update_image_url(&***pool, claims.user_id, None).await?;
    Success::ok(user)
}

/// Deletes the authenticated user's account, including the external
/// billing customer and every local row owned by the user.
#[delete("/account")]
pub async fn delete_account(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let client = common::stripe::create_client(&config.stripe_secret_key);
    services::user::delete_account(&client, &pool, claims.user_id).await?;
    Success::no_content()
}
