use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::models::user::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::password::verify_password;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::ValidationError("email and password are required".to_string()))?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::ValidationError("email and password are required".to_string()))?;

    let row: Option<(i64, String, String, String, String)> = sqlx::query_as(
        "SELECT user_id, full_name, email, user_type, password_hash \
         FROM app_user WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    let (user_id, full_name, email, user_type, password_hash) = row.ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &password_hash)? {
        return Err(invalid_credentials());
    }

    let user = AuthenticatedUser {
        user_id,
        full_name,
        email,
        user_type,
    };

    Ok(success(user, "Login successful"))
}

fn invalid_credentials() -> AppError {
    AppError::AuthError("Email or password is incorrect".to_string())
}
