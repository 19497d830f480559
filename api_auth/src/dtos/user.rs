use api_billing::dtos::billing::SubscriptionView;
use db::models::plan::Currency;
use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub username: String,
    pub currency: Currency,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub image_url: String,
}

/// The dashboard's view of the current user: profile fields plus the
/// subscription (with plan key) when one exists.
#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub avatar_url: Option<String>,
    pub subscription: Option<SubscriptionView>,
}
