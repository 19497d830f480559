use common::error::{AppError, Res};
use db::dtos::user::UserCreateRequest;
use db::models::user::User;
use sqlx::PgPool;
use stripe::Client;
use uuid::Uuid;

use crate::dtos::auth::RegisterRequest;
use crate::dtos::user::{OnboardingRequest, Profile};

/// Creates a user and their credentials row in one transaction.
pub async fn create_user_with_credentials(pool: &PgPool, req: &RegisterRequest) -> Res<User> {
    let password_hash = super::auth::hash_password(&req.password)?;

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            email: req.email.clone(),
            username: req.username.clone(),
        },
    )
    .await?;
    db::user::insert_credentials(&mut *tx, user.id, &password_hash).await?;
    tx.commit().await.map_err(AppError::from)?;

    Ok(user)
}

/// Assembles the dashboard profile: user, avatar and the subscription
/// with its plan key when the user has one.
pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Res<Profile> {
    let user = db::user::get_user_by_id(pool, user_id).await?;
    let subscription =
        api_billing::services::subscription::get_current_subscription(pool, user_id).await?;

    Ok(Profile {
        avatar_url: user.image_url.clone(),
        user,
        subscription,
    })
}

/// Finishes onboarding: stores the username and bootstraps the billing
/// identity (Stripe customer plus free-tier subscription). Safe to call
/// again; a user that already has a customer id keeps it.
pub async fn complete_onboarding(
    client: &Client,
    pool: &PgPool,
    user_id: Uuid,
    req: OnboardingRequest,
) -> Res<Profile> {
    db::user::update_username(pool, user_id, &req.username).await?;

    let user = db::user::get_user_by_id(pool, user_id).await?;
    api_billing::services::customer::setup_customer(client, pool, &user, req.currency).await?;

    get_profile(pool, user_id).await
}

/// Deletes the account: cancels and removes the Stripe customer first,
/// then drops the local rows. Apps and credentials go with the user row
/// via cascade; the subscription is removed explicitly in the same
/// transaction.
pub async fn delete_account(client: &Client, pool: &PgPool, user_id: Uuid) -> Res<()> {
    let user = db::user::get_user_by_id(pool, user_id).await?;

    match user.customer_id.as_deref() {
        Some(customer_id) => {
            api_billing::services::customer::cancel_and_delete_customer(client, customer_id)
                .await?;
        }
        None => log::warn!("No billing customer for user {}", user.id),
    }

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::subscription::delete_subscription_by_user_id(&mut *tx, user.id).await?;
    db::user::delete_user(&mut *tx, user.id).await?;
    tx.commit().await.map_err(AppError::from)?;

    Ok(())
}
