use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::order::{OrderLine, OrderStatus};
use crate::models::ticket::TicketStatus;
use crate::models::user::RoleTarget;
use crate::services::roles::ensure_role;
use crate::utils::error::AppError;

/// Checkout payload. `tickets` maps tier id to requested quantity; unit
/// prices are always resolved server-side from the pricing tables.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Option<i64>,
    pub customer: Option<BuyerContact>,
    pub event_id: Option<i64>,
    pub session_id: Option<i64>,
    pub tickets: Option<BTreeMap<i64, i64>>,
}

/// Contact details entered on the checkout form. Accepted for API
/// compatibility; orders are keyed by `customer_id` only.
#[derive(Debug, Deserialize)]
pub struct BuyerContact {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub total_amount: Decimal,
}

pub async fn create_order(pool: &PgPool, req: CreateOrderRequest) -> Result<OrderReceipt, AppError> {
    let session_id = req
        .session_id
        .ok_or_else(|| AppError::ValidationError("session_id is required".to_string()))?;

    let requested = normalize_quantities(req.tickets.as_ref());
    if requested.is_empty() {
        return Err(AppError::ValidationError(
            "Select at least one ticket".to_string(),
        ));
    }

    let lines = resolve_lines(pool, session_id, &requested).await?;
    let total_amount = order_total(&lines);
    let seats_requested: i64 = lines.iter().map(|line| line.quantity).sum();

    let mut tx = pool.begin().await?;

    if let Some(customer_id) = req.customer_id {
        ensure_role(&mut tx, customer_id, RoleTarget::Customer).await?;
    }

    reserve_seats(&mut tx, session_id, seats_requested).await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO ticket_order (customer_id, order_datetime, total_amount, order_status) \
         VALUES ($1, now(), $2, $3) RETURNING order_id",
    )
    .bind(req.customer_id)
    .bind(total_amount)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        for _ in 0..line.quantity {
            sqlx::query(
                "INSERT INTO ticket (session_id, order_id, ticket_type, ticket_price, ticket_status, unique_qr) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(session_id)
            .bind(order_id)
            .bind(&line.ticket_type)
            .bind(line.unit_price)
            .bind(TicketStatus::Unpaid.as_str())
            .bind(redemption_code(order_id))
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(order_id, %total_amount, seats = seats_requested, "Order created");

    Ok(OrderReceipt {
        order_id,
        total_amount,
    })
}

/// Drop zero and negative quantities; an empty result means an empty cart.
fn normalize_quantities(tickets: Option<&BTreeMap<i64, i64>>) -> Vec<(i64, i64)> {
    tickets
        .map(|map| {
            map.iter()
                .filter(|(_, qty)| **qty > 0)
                .map(|(tier, qty)| (*tier, *qty))
                .collect()
        })
        .unwrap_or_default()
}

/// Look up the effective unit price of every requested tier for this
/// session: the session-specific price when defined, else the tier's base
/// price. The client never supplies a price.
async fn resolve_lines(
    pool: &PgPool,
    session_id: i64,
    requested: &[(i64, i64)],
) -> Result<Vec<OrderLine>, AppError> {
    let mut lines = Vec::with_capacity(requested.len());

    for &(tier_id, quantity) in requested {
        let row: Option<(String, Decimal)> = sqlx::query_as(
            "SELECT pt.tier_name, COALESCE(dp.price, pt.base_price) AS unit_price \
             FROM pricing_tier pt \
             LEFT JOIN define_pricing dp ON dp.tier_id = pt.tier_id AND dp.session_id = $2 \
             WHERE pt.tier_id = $1",
        )
        .bind(tier_id)
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        let (ticket_type, unit_price) = row.ok_or_else(|| {
            AppError::NotFound(format!("No pricing found for ticket tier {}", tier_id))
        })?;

        lines.push(OrderLine {
            tier_id,
            ticket_type,
            quantity,
            unit_price,
        });
    }

    Ok(lines)
}

fn order_total(lines: &[OrderLine]) -> Decimal {
    let total: Decimal = lines
        .iter()
        .map(|line| Decimal::from(line.quantity) * line.unit_price)
        .sum();
    total.max(Decimal::ZERO)
}

/// Atomic conditional decrement of the session's seat budget. Zero affected
/// rows with an existing session means the remaining capacity is smaller
/// than the request, which fails the whole order.
async fn reserve_seats(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session_id: i64,
    seats: i64,
) -> Result<(), AppError> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT session_id FROM event_session WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&mut **tx)
            .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Session {} does not exist",
            session_id
        )));
    }

    let updated = sqlx::query(
        "UPDATE event_session \
         SET available_seats_count = available_seats_count - $2 \
         WHERE session_id = $1 AND available_seats_count >= $2",
    )
    .bind(session_id)
    .bind(i32::try_from(seats).unwrap_or(i32::MAX))
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Not enough seats left in session {}",
            session_id
        )));
    }

    Ok(())
}

/// Redemption code encoded into the ticket's QR payload: order id, creation
/// time and a random suffix. A unique index on the column backstops the
/// negligible collision probability.
fn redemption_code(order_id: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "QR-{}-{}-{}",
        order_id,
        Utc::now().timestamp_millis(),
        &suffix[..9]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn line(tier_id: i64, quantity: i64, unit_price: &str) -> OrderLine {
        OrderLine {
            tier_id,
            ticket_type: format!("Tier {}", tier_id),
            quantity,
            unit_price: Decimal::from_str(unit_price).unwrap(),
        }
    }

    #[test]
    fn normalize_drops_zero_and_negative_quantities() {
        let mut cart = BTreeMap::new();
        cart.insert(1, 2);
        cart.insert(2, 0);
        cart.insert(3, -4);

        assert_eq!(normalize_quantities(Some(&cart)), vec![(1, 2)]);
    }

    #[test]
    fn normalize_of_missing_cart_is_empty() {
        assert!(normalize_quantities(None).is_empty());
    }

    #[test]
    fn total_sums_quantity_times_unit_price() {
        // Standard x2 at 100000 plus VIP x1 at 250000.
        let lines = vec![line(1, 2, "100000"), line(2, 1, "250000")];
        assert_eq!(order_total(&lines), Decimal::from_str("450000").unwrap());
    }

    #[test]
    fn total_is_floored_at_zero() {
        let lines = vec![line(1, 1, "-500")];
        assert_eq!(order_total(&lines), Decimal::ZERO);
    }

    #[test]
    fn redemption_codes_are_distinct_and_carry_the_order_id() {
        let codes: HashSet<String> = (0..200).map(|_| redemption_code(42)).collect();
        assert_eq!(codes.len(), 200);
        assert!(codes.iter().all(|code| code.starts_with("QR-42-")));
    }

    #[test]
    fn checkout_payload_deserializes_with_integer_tier_keys() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{
                "customer_id": 7,
                "customer": {"full_name": "An Tran", "email": "an@example.com", "phone": "0900000000"},
                "session_id": 3,
                "tickets": {"1": 2, "2": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(req.session_id, Some(3));
        let cart = req.tickets.unwrap();
        assert_eq!(cart.get(&1), Some(&2));
        assert_eq!(cart.get(&2), Some(&1));
    }

    #[test]
    fn legacy_items_payload_is_not_accepted_as_a_cart() {
        // The pre-expanded list format with client prices was retired; a body
        // carrying only `items` now reads as an empty cart.
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"session_id": 3, "items": [{"ticket_type": "VIP", "quantity": 1, "unit_price": 1}]}"#,
        )
        .unwrap();

        assert!(normalize_quantities(req.tickets.as_ref()).is_empty());
    }
}
