use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::models::payment::PaymentMethod;
use crate::services::payments;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct InstructionQuery {
    pub method: Option<String>,
}

/// GET /api/payment/qr/:order_id?method=
/// Issue the payment instruction for an order. Defaults to a bank transfer.
pub async fn payment_qr(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Query(query): Query<InstructionQuery>,
) -> Result<Response, AppError> {
    let method = parse_method(query.method.as_deref())?;

    let instruction = payments::payment_instruction(&state, order_id, method).await?;

    Ok(success(instruction, "Payment instruction issued"))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub payment_method: Option<String>,
}

/// POST /api/payment/confirm/:order_id: record an out-of-band payment.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Response, AppError> {
    let method = parse_method(body.payment_method.as_deref())?;

    let order_id = payments::confirm_payment(&state.db, order_id, method).await?;

    Ok(success(json!({ "order_id": order_id }), "Payment confirmed"))
}

fn parse_method(raw: Option<&str>) -> Result<PaymentMethod, AppError> {
    match raw {
        None => Ok(PaymentMethod::BankTransfer),
        Some(raw) => PaymentMethod::parse(raw).ok_or_else(|| {
            AppError::ValidationError(format!("Unsupported payment method '{}'", raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_defaults_to_bank_transfer() {
        assert_eq!(parse_method(None).unwrap(), PaymentMethod::BankTransfer);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(matches!(
            parse_method(Some("PAYPAL")),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn wallet_methods_parse() {
        assert_eq!(parse_method(Some("MOMO")).unwrap(), PaymentMethod::Momo);
        assert_eq!(parse_method(Some("ZALOPAY")).unwrap(), PaymentMethod::ZaloPay);
    }
}
