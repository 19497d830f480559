use serde::{Deserialize, Serialize};
use uuid::Uuid;

use db::models::plan::{Currency, Interval};
use db::models::subscription::Subscription;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: Uuid,
    pub interval: Interval,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted checkout url. `None` when the user is already on a paid
    /// plan and no checkout is needed.
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct AutoRenewRequest {
    pub auto_renew: bool,
}

/// A subscription row joined with the key and name of its plan.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub plan_key: String,
    pub plan_name: String,
    #[serde(flatten)]
    pub subscription: Subscription,
}
