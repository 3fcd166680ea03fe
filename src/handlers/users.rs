use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::ticket::CustomerTicket;
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

/// GET /api/users/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let profile: Option<UserProfile> = sqlx::query_as(
        "SELECT user_id, full_name, email, phone_number, gender, birth_date AS birthday, user_type \
         FROM app_user WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;

    let profile =
        profile.ok_or_else(|| AppError::NotFound(format!("User {} does not exist", user_id)))?;

    Ok(success(profile, "Profile loaded"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// PUT /api/users/:id: basic profile fields only, never the credential.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Response, AppError> {
    let full_name = body
        .full_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ValidationError("full_name is required".to_string()))?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT user_id FROM app_user WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!("User {} does not exist", user_id)));
    }

    sqlx::query(
        "UPDATE app_user \
         SET full_name = $1, phone_number = $2, gender = $3, birth_date = $4 \
         WHERE user_id = $5",
    )
    .bind(&full_name)
    .bind(&body.phone_number)
    .bind(&body.gender)
    .bind(body.birthday)
    .bind(user_id)
    .execute(&state.db)
    .await?;

    Ok(empty_success("Profile updated"))
}

#[derive(Debug, Deserialize)]
pub struct MyTicketsQuery {
    #[serde(rename = "customerId")]
    pub customer_id: Option<i64>,
}

/// GET /api/my/tickets?customerId=
pub async fn my_tickets(
    State(state): State<AppState>,
    Query(query): Query<MyTicketsQuery>,
) -> Result<Response, AppError> {
    let customer_id = query
        .customer_id
        .ok_or_else(|| AppError::ValidationError("customerId is required".to_string()))?;

    let tickets: Vec<CustomerTicket> = sqlx::query_as(
        "SELECT t.ticket_id, t.ticket_type, t.ticket_price, t.ticket_status, t.unique_qr, \
                es.session_id, es.start_date, e.event_id, e.event_name, \
                o.order_id, o.order_datetime \
         FROM ticket t \
         JOIN ticket_order o ON o.order_id = t.order_id \
         JOIN event_session es ON es.session_id = t.session_id \
         JOIN event e ON e.event_id = es.event_id \
         WHERE o.customer_id = $1 \
         ORDER BY o.order_datetime DESC",
    )
    .bind(customer_id)
    .fetch_all(&state.db)
    .await?;

    Ok(success(tickets, "Tickets loaded"))
}
