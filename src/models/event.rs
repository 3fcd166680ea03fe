use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Canonical event row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub event_id: i64,
    pub user_id: i64,
    pub event_name: String,
    pub event_description: Option<String>,
    pub event_category: Option<String>,
    pub event_duration: Option<String>,
    pub poster_image: Option<String>,
    pub primary_language: Option<String>,
    pub privacy_level: Option<String>,
    pub is_online_event: bool,
}

/// Browse-listing row: event plus its earliest session and cheapest tier.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventSummary {
    pub event_id: i64,
    pub event_name: String,
    pub event_category: Option<String>,
    pub primary_language: Option<String>,
    pub privacy_level: Option<String>,
    pub event_description: Option<String>,
    pub poster_image: Option<String>,
    pub first_start_date: Option<DateTime<Utc>>,
    pub min_price: Option<Decimal>,
}

/// Event header of the public detail page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventHeader {
    pub event_id: i64,
    pub event_name: String,
    pub event_category: Option<String>,
    pub event_description: Option<String>,
    pub primary_language: Option<String>,
    pub poster_image: Option<String>,
    pub min_price: Option<Decimal>,
}
