use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::services::checkin;
use crate::services::orders::{self, CreateOrderRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

/// POST /api/orders: create the order and its tickets, all PENDING/UNPAID.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Response, AppError> {
    let receipt = orders::create_order(&state.db, body).await?;
    Ok(created(receipt, "Order created"))
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub ticket_id: Option<i64>,
    pub order_id: Option<i64>,
}

/// POST /api/tickets/check-in: validate a scanned redemption code and mark
/// the ticket CHECKED_IN.
pub async fn check_in_ticket(
    State(state): State<AppState>,
    Json(body): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    let ticket_id = body
        .ticket_id
        .ok_or_else(|| AppError::ValidationError("ticket_id is required".to_string()))?;

    let ticket = checkin::check_in(&state.db, ticket_id, body.order_id).await?;

    Ok(success(ticket, "Check-in successful"))
}
