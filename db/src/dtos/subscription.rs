use uuid::Uuid;

pub struct SubscriptionCreateRequest {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub price_stripe_id: String,
    pub stripe_id: String,
    pub currency: String,
    pub interval: String,
    pub status: String,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub cancel_at_period_end: bool,
}
