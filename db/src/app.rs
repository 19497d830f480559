use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::app::{AppCreateRequest, AppUpdateRequest},
    models::app::App,
};

pub async fn get_apps_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<App>> {
    sqlx::query_as::<_, App>("SELECT * FROM apps WHERE user_id = $1 ORDER BY created_at")
        .bind(user_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_app_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    app_id: Uuid,
) -> Res<Option<App>> {
    sqlx::query_as::<_, App>("SELECT * FROM apps WHERE id = $1")
        .bind(app_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_app<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AppCreateRequest,
) -> Res<App> {
    sqlx::query_as::<_, App>(
        r#"
        INSERT INTO apps (user_id, name, description, api_key, status)
        VALUES ($1, $2, $3, $4, 'active')
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.api_key)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Partial update: absent fields keep their stored value.
pub async fn update_app<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    app_id: Uuid,
    data: AppUpdateRequest,
) -> Res<App> {
    sqlx::query_as::<_, App>(
        r#"
        UPDATE apps
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            status = COALESCE($3, status),
            updated_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.status)
    .bind(app_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_app_api_key<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    app_id: Uuid,
    api_key: &str,
) -> Res<App> {
    sqlx::query_as::<_, App>(
        "UPDATE apps SET api_key = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(api_key)
    .bind(app_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_app<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    app_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM apps WHERE id = $1")
        .bind(app_id)
        .execute(executor)
        .await?;
    Ok(())
}
