use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::event::{EventHeader, EventSummary};
use crate::models::pricing::SessionTierPrice;
use crate::models::session::SessionWithVenue;
use crate::models::user::RoleTarget;
use crate::services::roles::ensure_role;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

// Sessions created through the quick event form land on the seeded default
// venue with a standard seat budget.
const DEFAULT_VENUE_ID: i64 = 1;
const DEFAULT_SEAT_BUDGET: i32 = 100;

/// GET /api/events: public browse listing.
pub async fn list_public_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events: Vec<EventSummary> = sqlx::query_as(
        "SELECT e.event_id, e.event_name, e.event_category, e.primary_language, \
                e.privacy_level, e.event_description, e.poster_image, \
                MIN(s.start_date) AS first_start_date, \
                MIN(dp.price)     AS min_price \
         FROM event e \
         LEFT JOIN event_session s ON s.event_id = e.event_id \
         LEFT JOIN define_pricing dp ON dp.session_id = s.session_id \
         GROUP BY e.event_id, e.event_name, e.event_category, e.primary_language, \
                  e.privacy_level, e.event_description, e.poster_image \
         ORDER BY first_start_date ASC NULLS LAST",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(success(events, "Events loaded"))
}

#[derive(Serialize)]
struct EventDetail {
    event: EventHeader,
    sessions: Vec<SessionWithVenue>,
    pricing_tiers: Vec<SessionTierPrice>,
}

/// GET /api/events/:id: event header, sessions with venues, and the tier
/// prices of each session.
pub async fn event_detail(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event: Option<EventHeader> = sqlx::query_as(
        "SELECT e.event_id, e.event_name, e.event_category, e.event_description, \
                e.primary_language, e.poster_image, MIN(dp.price) AS min_price \
         FROM event e \
         LEFT JOIN event_session s ON s.event_id = e.event_id \
         LEFT JOIN define_pricing dp ON dp.session_id = s.session_id \
         WHERE e.event_id = $1 \
         GROUP BY e.event_id, e.event_name, e.event_category, e.event_description, \
                  e.primary_language, e.poster_image",
    )
    .bind(event_id)
    .fetch_optional(&state.db)
    .await?;

    let event = event.ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let sessions: Vec<SessionWithVenue> = sqlx::query_as(
        "SELECT s.session_id, s.event_id, s.venue_id, v.venue_name, v.venue_address, \
                s.start_date, s.end_date, s.open_date, s.close_date, \
                s.available_seats_count, s.session_status \
         FROM event_session s \
         JOIN venue v ON v.venue_id = s.venue_id \
         WHERE s.event_id = $1 \
         ORDER BY s.start_date ASC",
    )
    .bind(event_id)
    .fetch_all(&state.db)
    .await?;

    let pricing_tiers: Vec<SessionTierPrice> = sqlx::query_as(
        "SELECT s.session_id, t.tier_id, t.tier_name, COALESCE(dp.price, t.base_price) AS price \
         FROM pricing_tier t \
         JOIN define_pricing dp ON dp.tier_id = t.tier_id \
         JOIN event_session s ON s.session_id = dp.session_id \
         WHERE s.event_id = $1",
    )
    .bind(event_id)
    .fetch_all(&state.db)
    .await?;

    Ok(success(
        EventDetail {
            event,
            sessions,
            pricing_tiers,
        },
        "Event loaded",
    ))
}

#[derive(Debug, Deserialize)]
pub struct MyEventsQuery {
    #[serde(rename = "organizerId")]
    pub organizer_id: Option<i64>,
}

/// GET /api/my/events?organizerId=
pub async fn my_events(
    State(state): State<AppState>,
    Query(query): Query<MyEventsQuery>,
) -> Result<Response, AppError> {
    let organizer_id = query
        .organizer_id
        .ok_or_else(|| AppError::ValidationError("organizerId is required".to_string()))?;

    let events: Vec<EventSummary> = sqlx::query_as(
        "SELECT e.event_id, e.event_name, e.event_category, e.primary_language, \
                e.privacy_level, e.event_description, e.poster_image, \
                MIN(s.start_date) AS first_start_date, \
                COALESCE(MIN(dp.price), 0) AS min_price \
         FROM event e \
         LEFT JOIN event_session s ON s.event_id = e.event_id \
         LEFT JOIN define_pricing dp ON dp.session_id = s.session_id \
         WHERE e.user_id = $1 \
         GROUP BY e.event_id, e.event_name, e.event_category, e.primary_language, \
                  e.privacy_level, e.event_description, e.poster_image \
         ORDER BY e.event_id DESC",
    )
    .bind(organizer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(success(events, "Events loaded"))
}

#[derive(Debug, Deserialize)]
pub struct AdminEventsQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

/// GET /api/admin/events: listing with optional keyword/category filter.
pub async fn admin_list_events(
    State(state): State<AppState>,
    Query(query): Query<AdminEventsQuery>,
) -> Result<Response, AppError> {
    let keyword = query
        .keyword
        .filter(|k| !k.is_empty())
        .map(|k| format!("%{}%", k));

    let events: Vec<crate::models::event::Event> = sqlx::query_as(
        "SELECT e.event_id, e.user_id, e.event_name, e.event_description, e.event_category, \
                e.event_duration, e.poster_image, e.primary_language, e.privacy_level, \
                e.is_online_event \
         FROM event e \
         WHERE ($1::TEXT IS NULL OR e.event_name ILIKE $1 OR e.event_description ILIKE $1) \
           AND ($2::TEXT IS NULL OR e.event_category = $2) \
         ORDER BY e.event_id DESC",
    )
    .bind(keyword)
    .bind(query.category.filter(|c| !c.is_empty()))
    .fetch_all(&state.db)
    .await?;

    Ok(success(events, "Events loaded"))
}

#[derive(Debug, Deserialize)]
pub struct AdminCreateEventRequest {
    pub user_id: Option<i64>,
    pub event_name: Option<String>,
    pub event_description: Option<String>,
    pub event_category: Option<String>,
    pub event_duration: Option<String>,
    pub primary_language: Option<String>,
    pub privacy_level: Option<String>,
    #[serde(default)]
    pub is_online_event: bool,
    pub poster_image: Option<String>,
    #[serde(default)]
    pub sessions: Vec<SessionInput>,
    #[serde(default)]
    pub ticket_types: Vec<TicketTypeInput>,
}

#[derive(Debug, Deserialize)]
pub struct SessionInput {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TicketTypeInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

/// POST /api/admin/events: create the event, its pricing tiers, its
/// sessions, and the per-session tier prices in one transaction. The acting
/// user is upgraded to ORGANIZER inline.
pub async fn admin_create_event(
    State(state): State<AppState>,
    Json(body): Json<AdminCreateEventRequest>,
) -> Result<Response, AppError> {
    let user_id = body
        .user_id
        .ok_or_else(|| AppError::ValidationError("user_id is required".to_string()))?;
    let event_name = body
        .event_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ValidationError("event_name is required".to_string()))?;

    let mut tx = state.db.begin().await?;

    ensure_role(&mut tx, user_id, RoleTarget::Organizer).await?;

    let event_id: i64 = sqlx::query_scalar(
        "INSERT INTO event (user_id, event_name, event_description, event_category, \
                            event_duration, poster_image, primary_language, privacy_level, \
                            is_online_event) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING event_id",
    )
    .bind(user_id)
    .bind(event_name)
    .bind(&body.event_description)
    .bind(&body.event_category)
    .bind(&body.event_duration)
    .bind(&body.poster_image)
    .bind(&body.primary_language)
    .bind(&body.privacy_level)
    .bind(body.is_online_event)
    .fetch_one(&mut *tx)
    .await?;

    let mut tiers: Vec<(i64, Decimal)> = Vec::new();
    for ticket_type in &body.ticket_types {
        let (name, price) = match (&ticket_type.name, ticket_type.price) {
            (Some(name), Some(price)) if !name.is_empty() => (name, price),
            _ => continue,
        };

        let tier_id: i64 =
            sqlx::query_scalar("INSERT INTO pricing_tier (tier_name, base_price) VALUES ($1, $2) RETURNING tier_id")
                .bind(name)
                .bind(price)
                .fetch_one(&mut *tx)
                .await?;
        tiers.push((tier_id, price));
    }

    for session in &body.sessions {
        let (date, start_time, end_time) = match (&session.date, &session.start_time, &session.end_time) {
            (Some(date), Some(start), Some(end)) => (date, start, end),
            _ => continue,
        };

        let start_date = parse_session_datetime(date, start_time)?;
        let end_date = parse_session_datetime(date, end_time)?;

        let session_id: i64 = sqlx::query_scalar(
            "INSERT INTO event_session (event_id, venue_id, start_date, end_date, \
                                        available_seats_count, session_status) \
             VALUES ($1, $2, $3, $4, $5, 'SCHEDULED') RETURNING session_id",
        )
        .bind(event_id)
        .bind(DEFAULT_VENUE_ID)
        .bind(start_date)
        .bind(end_date)
        .bind(DEFAULT_SEAT_BUDGET)
        .fetch_one(&mut *tx)
        .await?;

        for (tier_id, price) in &tiers {
            sqlx::query("INSERT INTO define_pricing (session_id, tier_id, price) VALUES ($1, $2, $3)")
                .bind(session_id)
                .bind(tier_id)
                .bind(price)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(event_id, user_id, "Event created");

    Ok(created(json!({ "event_id": event_id }), "Event created"))
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateEventRequest {
    pub event_name: Option<String>,
    pub event_description: Option<String>,
    pub event_category: Option<String>,
    pub event_duration: Option<String>,
    pub primary_language: Option<String>,
    pub privacy_level: Option<String>,
    #[serde(default)]
    pub is_online_event: bool,
    pub poster_image: Option<String>,
}

/// PUT /api/admin/events/:id
pub async fn admin_update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(body): Json<AdminUpdateEventRequest>,
) -> Result<Response, AppError> {
    let event_name = body
        .event_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ValidationError("event_name is required".to_string()))?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT event_id FROM event WHERE event_id = $1")
        .bind(event_id)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!("Event {} does not exist", event_id)));
    }

    sqlx::query(
        "UPDATE event \
         SET event_name = $1, event_description = $2, event_category = $3, \
             event_duration = $4, poster_image = $5, primary_language = $6, \
             privacy_level = $7, is_online_event = $8 \
         WHERE event_id = $9",
    )
    .bind(event_name)
    .bind(&body.event_description)
    .bind(&body.event_category)
    .bind(&body.event_duration)
    .bind(&body.poster_image)
    .bind(&body.primary_language)
    .bind(&body.privacy_level)
    .bind(body.is_online_event)
    .bind(event_id)
    .execute(&state.db)
    .await?;

    Ok(empty_success("Event updated"))
}

/// DELETE /api/admin/events/:id
pub async fn admin_delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT event_id FROM event WHERE event_id = $1")
        .bind(event_id)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!("Event {} does not exist", event_id)));
    }

    sqlx::query("DELETE FROM event WHERE event_id = $1")
        .bind(event_id)
        .execute(&state.db)
        .await?;

    Ok(empty_success("Event deleted"))
}

/// Combine the form's date and wall-clock time ("2026-08-07", "19:30") into
/// a UTC timestamp.
fn parse_session_datetime(date: &str, time: &str) -> Result<DateTime<Utc>, AppError> {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            AppError::ValidationError(format!("Invalid session date/time: {} {}", date, time))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn session_datetime_parses_date_plus_wall_clock() {
        let parsed = parse_session_datetime("2026-08-07", "19:30").unwrap();
        assert_eq!(parsed.hour(), 19);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn malformed_session_datetime_is_a_validation_error() {
        assert!(matches!(
            parse_session_datetime("07/08/2026", "19:30"),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            parse_session_datetime("2026-08-07", "late"),
            Err(AppError::ValidationError(_))
        ));
    }
}
