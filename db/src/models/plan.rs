use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Billing tier keys mirrored from the Stripe product catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKey {
    Free,
    Pro,
    Business,
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanKey::Free => "free",
            PlanKey::Pro => "pro",
            PlanKey::Business => "business",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanKey::Free),
            "pro" => Ok(PlanKey::Pro),
            "business" => Ok(PlanKey::Business),
            other => Err(format!("Unknown plan key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Vnd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Vnd => "vnd",
        };
        f.write_str(s)
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            "vnd" => Ok(Currency::Vnd),
            other => Err(format!("Unsupported currency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Month,
    Year,
}

impl Interval {
    pub fn other(&self) -> Interval {
        match self {
            Interval::Month => Interval::Year,
            Interval::Year => Interval::Month,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Month => "month",
            Interval::Year => "year",
        };
        f.write_str(s)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(format!("Unsupported interval: {}", other)),
        }
    }
}

/// A single Stripe price: the price object id plus its unit amount
/// in the currency's smallest denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrice {
    pub stripe_id: String,
    pub amount: i64,
}

/// Prices of one billing interval, keyed by currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPrices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<PlanPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eur: Option<PlanPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnd: Option<PlanPrice>,
}

impl IntervalPrices {
    pub fn get(&self, currency: Currency) -> Option<&PlanPrice> {
        match currency {
            Currency::Usd => self.usd.as_ref(),
            Currency::Eur => self.eur.as_ref(),
            Currency::Vnd => self.vnd.as_ref(),
        }
    }

    pub fn set(&mut self, currency: Currency, price: PlanPrice) {
        match currency {
            Currency::Usd => self.usd = Some(price),
            Currency::Eur => self.eur = Some(price),
            Currency::Vnd => self.vnd = Some(price),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.usd.is_none() && self.eur.is_none() && self.vnd.is_none()
    }

    fn first(&self) -> Option<(Currency, &PlanPrice)> {
        [Currency::Usd, Currency::Eur, Currency::Vnd]
            .into_iter()
            .find_map(|currency| self.get(currency).map(|price| (currency, price)))
    }
}

/// The price a lookup settled on after fallback, together with the
/// interval and currency it actually belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub interval: Interval,
    pub currency: Currency,
    pub stripe_id: String,
    pub amount: i64,
}

/// Per-plan price matrix, interval x currency. Mirrors the Stripe
/// catalog and is stored as JSONB on the plan row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMatrix {
    #[serde(default)]
    pub month: IntervalPrices,
    #[serde(default)]
    pub year: IntervalPrices,
}

impl PriceMatrix {
    pub fn interval(&self, interval: Interval) -> &IntervalPrices {
        match interval {
            Interval::Month => &self.month,
            Interval::Year => &self.year,
        }
    }

    pub fn interval_mut(&mut self, interval: Interval) -> &mut IntervalPrices {
        match interval {
            Interval::Month => &mut self.month,
            Interval::Year => &mut self.year,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.month.is_empty() && self.year.is_empty()
    }

    /// Resolves the price for an interval and currency, degrading
    /// gracefully instead of failing when the exact combination is
    /// not in the catalog.
    ///
    /// An interval with no prices at all falls back to the other
    /// interval. Within the chosen interval, the currency resolves
    /// as requested -> USD -> EUR -> VND -> first available.
    /// Returns `None` only when the whole matrix is empty.
    pub fn resolve(&self, interval: Interval, currency: Currency) -> Option<ResolvedPrice> {
        let interval = if !self.interval(interval).is_empty() {
            interval
        } else {
            interval.other()
        };
        let prices = self.interval(interval);

        for candidate in [currency, Currency::Usd, Currency::Eur, Currency::Vnd] {
            if let Some(price) = prices.get(candidate) {
                return Some(ResolvedPrice {
                    interval,
                    currency: candidate,
                    stripe_id: price.stripe_id.clone(),
                    amount: price.amount,
                });
            }
        }

        prices.first().map(|(candidate, price)| ResolvedPrice {
            interval,
            currency: candidate,
            stripe_id: price.stripe_id.clone(),
            amount: price.amount,
        })
    }
}

/// Local mirror of one Stripe product and its recurring prices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub key: String,
    pub stripe_id: String,
    pub name: String,
    pub description: String,
    pub prices: Json<PriceMatrix>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(stripe_id: &str, amount: i64) -> PlanPrice {
        PlanPrice {
            stripe_id: stripe_id.to_string(),
            amount,
        }
    }

    #[test]
    fn resolves_exact_match() {
        let mut matrix = PriceMatrix::default();
        matrix.month.set(Currency::Eur, price("price_eur_m", 900));
        matrix.year.set(Currency::Eur, price("price_eur_y", 9000));

        let resolved = matrix.resolve(Interval::Year, Currency::Eur).unwrap();
        assert_eq!(resolved.stripe_id, "price_eur_y");
        assert_eq!(resolved.interval, Interval::Year);
        assert_eq!(resolved.currency, Currency::Eur);
    }

    #[test]
    fn falls_back_to_usd_when_currency_missing() {
        let mut matrix = PriceMatrix::default();
        matrix.month.set(Currency::Usd, price("price_usd_m", 1000));
        matrix.month.set(Currency::Eur, price("price_eur_m", 900));

        let resolved = matrix.resolve(Interval::Month, Currency::Vnd).unwrap();
        assert_eq!(resolved.currency, Currency::Usd);
        assert_eq!(resolved.stripe_id, "price_usd_m");
    }

    #[test]
    fn currency_chain_continues_past_usd() {
        let mut matrix = PriceMatrix::default();
        matrix.month.set(Currency::Vnd, price("price_vnd_m", 250_000));

        let resolved = matrix.resolve(Interval::Month, Currency::Eur).unwrap();
        assert_eq!(resolved.currency, Currency::Vnd);
    }

    #[test]
    fn empty_interval_falls_back_to_other_interval() {
        let mut matrix = PriceMatrix::default();
        matrix.year.set(Currency::Usd, price("price_usd_y", 10000));

        let resolved = matrix.resolve(Interval::Month, Currency::Usd).unwrap();
        assert_eq!(resolved.interval, Interval::Year);
        assert_eq!(resolved.stripe_id, "price_usd_y");
    }

    #[test]
    fn empty_matrix_resolves_to_none() {
        let matrix = PriceMatrix::default();
        assert!(matrix.resolve(Interval::Month, Currency::Usd).is_none());
    }

    #[test]
    fn matrix_round_trips_through_json() {
        let mut matrix = PriceMatrix::default();
        matrix.month.set(Currency::Usd, price("price_usd_m", 1000));
        matrix.year.set(Currency::Vnd, price("price_vnd_y", 2_500_000));

        let json = serde_json::to_string(&matrix).unwrap();
        let parsed: PriceMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, matrix);
    }
}
