use std::sync::Arc;

use actix_web::{Responder, delete, get, post, put, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::app::{CreateAppRequest, RegenerateKeyResponse, UpdateAppRequest},
    services,
};

/// Retrieves all apps of the authenticated user.
#[get("")]
pub async fn get_apps(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let apps = services::app::get_apps(&pool, claims.user_id).await?;
    Success::ok(apps)
}

/// Creates a new app for the authenticated user. The response carries
/// the generated API key.
#[post("")]
pub async fn post_create(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    req: web::Json<CreateAppRequest>,
) -> Res<impl Responder> {
    let app = services::app::create_app(&pool, claims.user_id, req.into_inner()).await?;
    Success::created(app)
}

/// Partially updates an app owned by the authenticated user.
#[put("/{app_id}")]
pub async fn put_update(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateAppRequest>,
) -> Res<impl Responder> {
    let app =
        services::app::update_app(&pool, path.into_inner(), claims.user_id, req.into_inner())
            .await?;
    Success::ok(app)
}

/// Deletes an app owned by the authenticated user.
#[delete("/{app_id}")]
pub async fn delete_app(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<Uuid>,
) -> Res<impl Responder> {
    services::app::delete_app(&pool, path.into_inner(), claims.user_id).await?;
    Success::no_content()
}

/// Regenerates the API key of an app owned by the authenticated user.
#[post("/{app_id}/regenerate")]
pub async fn post_regenerate(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    path: web::Path<Uuid>,
) -> Res<impl Responder> {
    let app = services::app::regenerate_api_key(&pool, path.into_inner(), claims.user_id).await?;
    Success::ok(RegenerateKeyResponse {
        api_key: app.api_key,
    })
}
