use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub order_datetime: DateTime<Utc>,
    pub total_amount: Decimal,
    pub order_status: String,
}

/// A normalized order line: one tier with a server-resolved unit price.
/// Quantity N expands into N ticket rows at persist time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub tier_id: i64,
    pub ticket_type: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}
