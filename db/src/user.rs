use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    dtos::user::UserCreateRequest,
    models::user::{AuthCredentials, User},
};

pub async fn exists_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    customer_id: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserCreateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.username)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    password_hash: &str,
) -> Res<()> {
    sqlx::query("INSERT INTO auth_credentials (user_id, password_hash) VALUES ($1, $2)")
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn get_user_with_password_hash(pool: &PgPool, email: &str) -> Res<(User, AuthCredentials)> {
    let user = get_user_by_email(pool, email).await?;
    let credentials = sqlx::query_as::<_, AuthCredentials>(
        "SELECT user_id, password_hash FROM auth_credentials WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_one(pool)
    .await
    .map_err(AppError::from)?;
    Ok((user, credentials))
}

pub async fn update_username<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    username: &str,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET username = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(username)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    customer_id: &str,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET customer_id = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(customer_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_image_url<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    image_url: Option<&str>,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET image_url = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(image_url)
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
