use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PricingTier {
    pub tier_id: i64,
    pub tier_name: String,
    pub base_price: Decimal,
}

/// Effective price of a tier for one session: the `define_pricing` join row,
/// falling back to the tier's base price. This is the authoritative unit
/// price at purchase time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionTierPrice {
    pub session_id: i64,
    pub tier_id: i64,
    pub tier_name: String,
    pub price: Decimal,
}
