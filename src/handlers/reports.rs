use axum::extract::{Query, State};
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::services::reports;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    #[serde(rename = "eventId")]
    pub event_id: Option<i64>,
    #[serde(rename = "minRevenue")]
    pub min_revenue: Option<Decimal>,
}

/// GET /api/admin/reports/open-sessions?eventId=
pub async fn open_sessions_report(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Response, AppError> {
    let event_id = required(query.event_id, "eventId")?;
    let rows = reports::open_sessions(&state.db, event_id).await?;
    Ok(success(rows, "Open sessions loaded"))
}

/// GET /api/admin/reports/event-revenue?eventId=&minRevenue=
pub async fn event_revenue_report(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Response, AppError> {
    let event_id = required(query.event_id, "eventId")?;
    let min_revenue = query.min_revenue.unwrap_or(Decimal::ZERO);
    let rows = reports::event_revenue(&state.db, event_id, min_revenue).await?;
    Ok(success(rows, "Revenue report loaded"))
}

/// GET /api/admin/stats/revenue?eventId=
/// Summed event revenue.
pub async fn revenue_stats(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Response, AppError> {
    let event_id = required(query.event_id, "eventId")?;
    let stats = reports::revenue_stats(&state.db, event_id).await?;
    Ok(success(stats, "Revenue stats loaded"))
}

#[derive(Debug, Deserialize)]
pub struct OrganizerRevenueQuery {
    #[serde(rename = "organizerId")]
    pub organizer_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/admin/functions/organizer-revenue?organizerId=&start=&end=
/// Omitting the window bounds means all time.
pub async fn organizer_revenue(
    State(state): State<AppState>,
    Query(query): Query<OrganizerRevenueQuery>,
) -> Result<Response, AppError> {
    let organizer_id = required(query.organizer_id, "organizerId")?;
    let start = parse_date_opt(query.start.as_deref())?;
    let end = parse_date_opt(query.end.as_deref())?;

    let total = reports::organizer_revenue(&state.db, organizer_id, start, end).await?;

    Ok(success(json!({ "total_revenue": total }), "Revenue computed"))
}

#[derive(Debug, Deserialize)]
pub struct CustomerTicketCountQuery {
    #[serde(rename = "customerId")]
    pub customer_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/admin/functions/customer-ticket-count?customerId=&start=&end=
pub async fn customer_ticket_count(
    State(state): State<AppState>,
    Query(query): Query<CustomerTicketCountQuery>,
) -> Result<Response, AppError> {
    let customer_id = required(query.customer_id, "customerId")?;
    let start = parse_date(query.start.as_deref(), "start")?;
    let end = parse_date(query.end.as_deref(), "end")?;

    let count = reports::customer_ticket_count(&state.db, customer_id, start, end).await?;

    Ok(success(json!({ "ticket_count": count }), "Ticket count computed"))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::ValidationError(format!("{} is required", name)))
}

fn parse_date(raw: Option<&str>, name: &str) -> Result<NaiveDate, AppError> {
    parse_date_opt(raw)?.ok_or_else(|| AppError::ValidationError(format!("{} is required", name)))
}

fn parse_date_opt(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::ValidationError(format!("Invalid date '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_iso_and_reject_other_shapes() {
        assert_eq!(
            parse_date_opt(Some("2026-08-07")).unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
        );
        assert_eq!(parse_date_opt(None).unwrap(), None);
        assert_eq!(parse_date_opt(Some("")).unwrap(), None);
        assert!(parse_date_opt(Some("07/08/2026")).is_err());
    }

    #[test]
    fn required_date_rejects_absence() {
        assert!(matches!(
            parse_date(None, "start"),
            Err(AppError::ValidationError(_))
        ));
    }
}
