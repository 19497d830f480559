use std::str::FromStr;

use common::error::Res;
use db::dtos::plan::PlanUpsertRequest;
use db::models::plan::{Currency, Interval, Plan, PlanKey, PlanPrice, PriceMatrix};
use sqlx::PgPool;
use stripe::{Client, Expandable, ListPrices, ListProducts, Price, Product};

/// Classifies a Stripe product into a plan key from its name.
/// Anything that is neither a pro nor a free tier lands on business.
pub(crate) fn classify_plan_key(product_name: &str) -> PlanKey {
    let name = product_name.to_lowercase();
    if name.contains("pro") {
        PlanKey::Pro
    } else if name.contains("free") {
        PlanKey::Free
    } else {
        PlanKey::Business
    }
}

/// Groups price entries into the interval x currency matrix stored on
/// the plan row. Later entries for the same slot win, matching how the
/// catalog lists prices newest-first.
pub(crate) fn build_price_matrix(
    entries: impl IntoIterator<Item = (Interval, Currency, PlanPrice)>,
) -> PriceMatrix {
    let mut matrix = PriceMatrix::default();
    for (interval, currency, price) in entries {
        matrix.interval_mut(interval).set(currency, price);
    }
    matrix
}

/// Maps a Stripe price onto a matrix entry. Non-recurring prices and
/// prices in unsupported currencies or intervals are skipped.
fn price_entry(price: &Price) -> Option<(Interval, Currency, PlanPrice)> {
    let recurring = price.recurring.as_ref()?;
    let interval = Interval::from_str(&recurring.interval.to_string()).ok()?;
    let currency = Currency::from_str(&price.currency?.to_string()).ok()?;
    Some((
        interval,
        currency,
        PlanPrice {
            stripe_id: price.id.to_string(),
            amount: price.unit_amount.unwrap_or(0),
        },
    ))
}

fn belongs_to_product(price: &Price, product: &Product) -> bool {
    match &price.product {
        Some(Expandable::Id(id)) => *id == product.id,
        Some(Expandable::Object(p)) => p.id == product.id,
        None => false,
    }
}

/// Synchronizes the Stripe product/price catalog into local plan rows.
///
/// Active products with at least one recurring price are upserted by
/// their Stripe product id; products without recurring prices are
/// skipped. Idempotent: re-running refreshes names, descriptions and
/// the price matrix in place.
pub async fn sync_plans(client: &Client, pool: &PgPool) -> Res<Vec<Plan>> {
    log::info!("Syncing Stripe products into local plans");

    let products = Product::list(
        client,
        &ListProducts {
            active: Some(true),
            limit: Some(100),
            ..Default::default()
        },
    )
    .await?;

    let prices = Price::list(
        client,
        &ListPrices {
            active: Some(true),
            limit: Some(100),
            ..Default::default()
        },
    )
    .await?;

    let mut plans = Vec::new();
    for product in products.data {
        let entries: Vec<_> = prices
            .data
            .iter()
            .filter(|price| belongs_to_product(price, &product))
            .filter_map(price_entry)
            .collect();

        if entries.is_empty() {
            continue;
        }

        let matrix = build_price_matrix(entries);
        let name = product.name.clone().unwrap_or_default();
        let key = classify_plan_key(&name);

        let plan = db::plan::upsert_plan(
            pool,
            PlanUpsertRequest {
                key: key.to_string(),
                stripe_id: product.id.to_string(),
                name,
                description: product.description.clone().unwrap_or_default(),
                prices: matrix,
            },
        )
        .await?;

        log::info!("Synced plan '{}' ({})", plan.name, plan.key);
        plans.push(plan);
    }

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plan_keys_from_product_names() {
        assert_eq!(classify_plan_key("Pro Plan"), PlanKey::Pro);
        assert_eq!(classify_plan_key("Free Tier"), PlanKey::Free);
        assert_eq!(classify_plan_key("Business"), PlanKey::Business);
        // unknown names fall back to business
        assert_eq!(classify_plan_key("Enterprise"), PlanKey::Business);
    }

    #[test]
    fn builds_matrix_grouped_by_interval_and_currency() {
        let matrix = build_price_matrix([
            (
                Interval::Month,
                Currency::Usd,
                PlanPrice {
                    stripe_id: "price_usd_m".to_string(),
                    amount: 1000,
                },
            ),
            (
                Interval::Year,
                Currency::Eur,
                PlanPrice {
                    stripe_id: "price_eur_y".to_string(),
                    amount: 9000,
                },
            ),
        ]);

        assert_eq!(matrix.month.usd.as_ref().unwrap().stripe_id, "price_usd_m");
        assert_eq!(matrix.year.eur.as_ref().unwrap().amount, 9000);
        assert!(matrix.month.eur.is_none());
        assert!(matrix.year.usd.is_none());
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let matrix = build_price_matrix([
            (
                Interval::Month,
                Currency::Usd,
                PlanPrice {
                    stripe_id: "price_old".to_string(),
                    amount: 500,
                },
            ),
            (
                Interval::Month,
                Currency::Usd,
                PlanPrice {
                    stripe_id: "price_new".to_string(),
                    amount: 1000,
                },
            ),
        ]);

        assert_eq!(matrix.month.usd.as_ref().unwrap().stripe_id, "price_new");
    }
}
