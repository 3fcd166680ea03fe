use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Session joined with its venue, as listed on the detail page and in the
/// admin session manager.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionWithVenue {
    pub session_id: i64,
    pub event_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_address: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub available_seats_count: i32,
    pub session_status: String,
}

/// Row shape of `sp_get_open_sessions`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OpenSession {
    pub session_id: i64,
    pub event_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub available_seats_count: i32,
    pub session_status: String,
}
