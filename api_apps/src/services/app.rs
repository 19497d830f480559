use common::error::{AppError, Res};
use common::key::generate_api_key;
use db::dtos::app::{AppCreateRequest, AppUpdateRequest};
use db::models::app::App;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::app::{CreateAppRequest, UpdateAppRequest};

/// Retrieves a list of apps owned by the given user.
pub async fn get_apps(pool: &PgPool, user_id: Uuid) -> Res<Vec<App>> {
    db::app::get_apps_by_user_id(pool, user_id).await
}

/// Fetches an app and checks ownership. A missing app and someone
/// else's app both come back as 404 so tenants cannot probe for ids.
async fn get_owned_app(pool: &PgPool, app_id: Uuid, user_id: Uuid) -> Res<App> {
    let app = db::app::get_app_by_id(pool, app_id)
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".to_string()))?;
    if app.user_id != user_id {
        return Err(AppError::NotFound("App not found".to_string()));
    }
    Ok(app)
}

/// Creates a new app for the user with a freshly generated API key.
pub async fn create_app(pool: &PgPool, user_id: Uuid, req: CreateAppRequest) -> Res<App> {
    let app = db::app::insert_app(
        pool,
        AppCreateRequest {
            user_id,
            name: req.name,
            description: req.description,
            api_key: generate_api_key(),
        },
    )
    .await?;

    log::info!("Created app {} for user {}", app.id, user_id);
    Ok(app)
}

/// Applies a partial update to an owned app.
pub async fn update_app(
    pool: &PgPool,
    app_id: Uuid,
    user_id: Uuid,
    req: UpdateAppRequest,
) -> Res<App> {
    get_owned_app(pool, app_id, user_id).await?;
    db::app::update_app(
        pool,
        app_id,
        AppUpdateRequest {
            name: req.name,
            description: req.description,
            status: req.status.map(|status| status.to_string()),
        },
    )
    .await
}

/// Deletes an owned app.
pub async fn delete_app(pool: &PgPool, app_id: Uuid, user_id: Uuid) -> Res<()> {
    get_owned_app(pool, app_id, user_id).await?;
    db::app::delete_app(pool, app_id).await
}

/// Regenerates the API key of an owned app, invalidating the old key.
pub async fn regenerate_api_key(pool: &PgPool, app_id: Uuid, user_id: Uuid) -> Res<App> {
    get_owned_app(pool, app_id, user_id).await?;
    let app = db::app::update_app_api_key(pool, app_id, &generate_api_key()).await?;

    log::info!("Regenerated API key for app {}", app.id);
    Ok(app)
}
