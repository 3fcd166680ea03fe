use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Unpaid,
    Paid,
    CheckedIn,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Unpaid => "UNPAID",
            TicketStatus::Paid => "PAID",
            TicketStatus::CheckedIn => "CHECKED_IN",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub ticket_id: i64,
    pub session_id: i64,
    pub order_id: i64,
    pub ticket_type: String,
    pub ticket_price: Decimal,
    pub ticket_status: String,
    pub unique_qr: String,
}

/// "My tickets" listing row, joined across order, session and event.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerTicket {
    pub ticket_id: i64,
    pub ticket_type: String,
    pub ticket_price: Decimal,
    pub ticket_status: String,
    pub unique_qr: String,
    pub session_id: i64,
    pub start_date: DateTime<Utc>,
    pub event_id: i64,
    pub event_name: String,
    pub order_id: i64,
    pub order_datetime: DateTime<Utc>,
}
