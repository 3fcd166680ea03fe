use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::models::session::SessionWithVenue;
use crate::services::reports;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<i64>,
}

/// GET /api/admin/sessions?eventId=
pub async fn admin_list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Response, AppError> {
    let sessions: Vec<SessionWithVenue> = sqlx::query_as(
        "SELECT es.session_id, es.event_id, es.venue_id, v.venue_name, v.venue_address, \
                es.start_date, es.end_date, es.open_date, es.close_date, \
                es.available_seats_count, es.session_status \
         FROM event_session es \
         JOIN venue v ON v.venue_id = es.venue_id \
         WHERE ($1::BIGINT IS NULL OR es.event_id = $1) \
         ORDER BY es.start_date ASC",
    )
    .bind(query.event_id)
    .fetch_all(&state.db)
    .await?;

    Ok(success(sessions, "Sessions loaded"))
}

/// GET /api/admin/sessions/open?eventId=
/// Sessions whose sale window is currently open, via `sp_get_open_sessions`.
pub async fn admin_open_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Response, AppError> {
    let event_id = query
        .event_id
        .ok_or_else(|| AppError::ValidationError("eventId is required".to_string()))?;

    let sessions = reports::open_sessions(&state.db, event_id).await?;

    Ok(success(sessions, "Open sessions loaded"))
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub event_id: Option<i64>,
    pub venue_id: Option<i64>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub open_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub available_seats_count: Option<i32>,
    pub session_status: Option<String>,
}

struct SessionFields {
    event_id: i64,
    venue_id: i64,
    start_datetime: DateTime<Utc>,
    end_datetime: DateTime<Utc>,
}

fn required_fields(body: &SessionRequest) -> Result<SessionFields, AppError> {
    match (
        body.event_id,
        body.venue_id,
        body.start_datetime,
        body.end_datetime,
        body.session_status.as_deref(),
    ) {
        (Some(event_id), Some(venue_id), Some(start), Some(end), Some(status)) if !status.is_empty() => {
            Ok(SessionFields {
                event_id,
                venue_id,
                start_datetime: start,
                end_datetime: end,
            })
        }
        _ => Err(AppError::ValidationError(
            "event_id, venue_id, start_datetime, end_datetime and session_status are required"
                .to_string(),
        )),
    }
}

/// POST /api/admin/sessions: insert through `sp_insert_event_session`.
/// The routine validates the session logic; its rejection is a 400.
pub async fn admin_create_session(
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> Result<Response, AppError> {
    let fields = required_fields(&body)?;

    let new_session_id: i64 =
        sqlx::query_scalar("SELECT sp_insert_event_session($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(fields.event_id)
            .bind(fields.venue_id)
            .bind(fields.start_datetime)
            .bind(fields.end_datetime)
            .bind(body.open_date)
            .bind(body.close_date)
            .bind(body.available_seats_count.unwrap_or(0))
            .bind(&body.session_status)
            .fetch_one(&state.db)
            .await
            .map_err(routine_rejection)?;

    Ok(created(
        json!({ "new_session_id": new_session_id }),
        "Session created",
    ))
}

/// PUT /api/admin/sessions/:id: update through `sp_update_event_session`.
pub async fn admin_update_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(body): Json<SessionRequest>,
) -> Result<Response, AppError> {
    let fields = required_fields(&body)?;

    sqlx::query("SELECT sp_update_event_session($1, $2, $3, $4, $5, $6, $7, $8, $9)")
        .bind(session_id)
        .bind(fields.event_id)
        .bind(fields.venue_id)
        .bind(fields.start_datetime)
        .bind(fields.end_datetime)
        .bind(body.open_date)
        .bind(body.close_date)
        .bind(body.available_seats_count.unwrap_or(0))
        .bind(&body.session_status)
        .execute(&state.db)
        .await
        .map_err(routine_rejection)?;

    Ok(empty_success("Session updated"))
}

/// DELETE /api/admin/sessions/:id: delete through `sp_delete_event_session`.
pub async fn admin_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Response, AppError> {
    sqlx::query("SELECT sp_delete_event_session($1)")
        .bind(session_id)
        .execute(&state.db)
        .await
        .map_err(routine_rejection)?;

    Ok(empty_success("Session deleted"))
}

/// The session routines raise on bad data or logic; report their message as
/// a validation failure rather than a server fault.
fn routine_rejection(e: sqlx::Error) -> AppError {
    match e.as_database_error() {
        Some(db) => AppError::ValidationError(db.message().to_string()),
        None => AppError::DatabaseError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_rejects_partial_payloads() {
        let body: SessionRequest = serde_json::from_str(r#"{"event_id": 1, "venue_id": 2}"#).unwrap();
        assert!(matches!(
            required_fields(&body),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn required_fields_accepts_a_complete_payload() {
        let body: SessionRequest = serde_json::from_str(
            r#"{
                "event_id": 1,
                "venue_id": 2,
                "start_datetime": "2026-08-07T19:00:00Z",
                "end_datetime": "2026-08-07T21:00:00Z",
                "session_status": "SCHEDULED"
            }"#,
        )
        .unwrap();

        let fields = required_fields(&body).unwrap();
        assert_eq!(fields.event_id, 1);
        assert_eq!(fields.venue_id, 2);
    }
}
