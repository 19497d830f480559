use crate::models::plan::PriceMatrix;

pub struct PlanUpsertRequest {
    pub key: String,
    pub stripe_id: String,
    pub name: String,
    pub description: String,
    pub prices: PriceMatrix,
}
