use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::models::order::OrderStatus;
use crate::models::ticket::TicketStatus;
use crate::utils::error::AppError;

#[derive(Debug, FromRow)]
struct CheckInRow {
    ticket_id: i64,
    order_id: i64,
    ticket_type: String,
    ticket_price: Decimal,
    ticket_status: String,
    order_status: String,
    start_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CheckedInTicket {
    pub ticket_id: i64,
    pub ticket_type: String,
    pub session_date: DateTime<Utc>,
    pub price: Decimal,
}

/// Validate a scanned ticket and transition it to CHECKED_IN.
///
/// The ticket row is read `FOR UPDATE` so a second concurrent scan of the
/// same ticket blocks until this transaction commits and then fails the
/// already-checked-in precondition.
pub async fn check_in(
    pool: &PgPool,
    ticket_id: i64,
    order_id: Option<i64>,
) -> Result<CheckedInTicket, AppError> {
    let mut tx = pool.begin().await?;

    let row: Option<CheckInRow> = sqlx::query_as(
        "SELECT t.ticket_id, t.order_id, t.ticket_type, t.ticket_price, t.ticket_status, \
                o.order_status, es.start_date \
         FROM ticket t \
         JOIN ticket_order o ON o.order_id = t.order_id \
         JOIN event_session es ON es.session_id = t.session_id \
         WHERE t.ticket_id = $1 \
         FOR UPDATE OF t",
    )
    .bind(ticket_id)
    .fetch_optional(&mut *tx)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("Ticket {} does not exist", ticket_id)))?;

    validate_redemption(&row, order_id)?;

    sqlx::query("UPDATE ticket SET ticket_status = $1 WHERE ticket_id = $2")
        .bind(TicketStatus::CheckedIn.as_str())
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(ticket_id, "Ticket checked in");

    Ok(CheckedInTicket {
        ticket_id: row.ticket_id,
        ticket_type: row.ticket_type,
        session_date: row.start_date,
        price: row.ticket_price,
    })
}

/// State preconditions, checked in order; each failure is distinct.
fn validate_redemption(row: &CheckInRow, supplied_order: Option<i64>) -> Result<(), AppError> {
    if let Some(order_id) = supplied_order {
        if order_id != row.order_id {
            return Err(AppError::Conflict(
                "Ticket code does not match the order".to_string(),
            ));
        }
    }

    if row.order_status != OrderStatus::Paid.as_str() {
        return Err(AppError::Conflict(format!(
            "Ticket has not been paid for (order status: {})",
            row.order_status
        )));
    }

    if row.ticket_status == TicketStatus::CheckedIn.as_str() {
        return Err(AppError::Conflict(
            "Ticket has already been checked in".to_string(),
        ));
    }

    if row.ticket_status == TicketStatus::Cancelled.as_str() {
        return Err(AppError::Conflict("Ticket has been cancelled".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(ticket_status: &str, order_status: &str) -> CheckInRow {
        CheckInRow {
            ticket_id: 11,
            order_id: 5,
            ticket_type: "VIP".to_string(),
            ticket_price: Decimal::from_str("250000").unwrap(),
            ticket_status: ticket_status.to_string(),
            order_status: order_status.to_string(),
            start_date: Utc::now(),
        }
    }

    #[test]
    fn paid_unredeemed_ticket_passes() {
        assert!(validate_redemption(&row("PAID", "PAID"), Some(5)).is_ok());
        assert!(validate_redemption(&row("PAID", "PAID"), None).is_ok());
    }

    #[test]
    fn mismatched_order_is_a_conflict() {
        let err = validate_redemption(&row("PAID", "PAID"), Some(99)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn pending_order_is_a_conflict_reporting_current_status() {
        let err = validate_redemption(&row("UNPAID", "PENDING"), None).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert!(msg.contains("PENDING")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn double_check_in_is_a_conflict() {
        let err = validate_redemption(&row("CHECKED_IN", "PAID"), None).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert!(msg.contains("already")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn cancelled_ticket_is_a_conflict() {
        let err = validate_redemption(&row("CANCELLED", "PAID"), None).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn order_match_is_checked_before_payment_state() {
        let err = validate_redemption(&row("UNPAID", "PENDING"), Some(99)).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert!(msg.contains("does not match")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }
}
