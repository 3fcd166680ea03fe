use chrono::Utc;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sqlx::PgPool;
use urlencoding::encode;

use crate::config::{BankAccount, MomoConfig, PaymentsConfig};
use crate::models::order::OrderStatus;
use crate::models::payment::PaymentMethod;
use crate::models::ticket::TicketStatus;
use crate::state::AppState;
use crate::utils::error::AppError;

const VIETQR_BASE: &str = "https://img.vietqr.io/image";

// VietQR bank codes used when a wallet provider is unreachable.
const MOMO_FALLBACK_BANK_ID: &str = "970422";
const ZALOPAY_FALLBACK_BANK_ID: &str = "970415";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
pub struct PaymentInstruction {
    pub order_id: i64,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub qr_url: String,
    pub bank_info: BankInfo,
}

#[derive(Debug, Serialize)]
pub struct BankInfo {
    pub bank_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_no: Option<String>,
    pub account_name: String,
    pub transfer_content: String,
}

/// The reference string the buyer must put on the transfer so the payment
/// can be matched to the order.
pub fn transfer_reference(order_id: i64) -> String {
    format!("TICKETBOX {}", order_id)
}

/// Build the payment instruction for an order. Wallet-provider failures are
/// downgraded to a static QR fallback; instruction issuance never hard-fails
/// the checkout screen because a third party is down.
pub async fn payment_instruction(
    state: &AppState,
    order_id: i64,
    method: PaymentMethod,
) -> Result<PaymentInstruction, AppError> {
    let order: Option<(i64, Decimal)> =
        sqlx::query_as("SELECT order_id, total_amount FROM ticket_order WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&state.db)
            .await?;

    let (order_id, total_amount) =
        order.ok_or_else(|| AppError::NotFound(format!("Order {} does not exist", order_id)))?;

    let cfg = &state.config.payments;
    let amount = total_amount.round().to_i64().unwrap_or(0);
    let reference = transfer_reference(order_id);

    let (qr_url, bank_info) = match method {
        PaymentMethod::BankTransfer => (
            vietqr_url(
                &cfg.bank.bank_id,
                &cfg.bank.account_no,
                "print",
                amount,
                &reference,
                &cfg.bank.account_name,
            ),
            bank_transfer_info(&cfg.bank, &reference),
        ),
        PaymentMethod::Momo => {
            let qr_url = match request_momo_pay_url(state, cfg, amount, order_id, &reference).await {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(order_id, error = %e, "MoMo unavailable, falling back to static QR");
                    wallet_fallback_url(cfg, MOMO_FALLBACK_BANK_ID, amount, &reference)
                }
            };
            (qr_url, wallet_info("MoMo", &cfg.bank, &reference))
        }
        PaymentMethod::ZaloPay => {
            let qr_url = match request_zalopay_order_url(state, cfg, amount, order_id, &reference).await
            {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(order_id, error = %e, "ZaloPay unavailable, falling back to static QR");
                    wallet_fallback_url(cfg, ZALOPAY_FALLBACK_BANK_ID, amount, &reference)
                }
            };
            (qr_url, wallet_info("ZaloPay", &cfg.bank, &reference))
        }
    };

    Ok(PaymentInstruction {
        order_id,
        total_amount,
        payment_method: method,
        qr_url,
        bank_info,
    })
}

/// Confirm an out-of-band payment: order and its open tickets become PAID
/// and a single success row is recorded. Confirming an already-paid order is
/// a no-op that reports success, so retries cannot duplicate the audit trail
/// or resurrect cancelled tickets.
pub async fn confirm_payment(
    pool: &PgPool,
    order_id: i64,
    method: PaymentMethod,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let status: Option<String> =
        sqlx::query_scalar("SELECT order_status FROM ticket_order WHERE order_id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;

    let status =
        status.ok_or_else(|| AppError::NotFound(format!("Order {} does not exist", order_id)))?;

    if status == OrderStatus::Paid.as_str() {
        tx.commit().await?;
        tracing::info!(order_id, "Order already confirmed, skipping");
        return Ok(order_id);
    }

    sqlx::query("UPDATE ticket_order SET order_status = $1 WHERE order_id = $2")
        .bind(OrderStatus::Paid.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE ticket SET ticket_status = $1 WHERE order_id = $2 AND ticket_status = $3")
        .bind(TicketStatus::Paid.as_str())
        .bind(order_id)
        .bind(TicketStatus::Unpaid.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO payment (order_id, payment_datetime, payment_status, payment_method) \
         VALUES ($1, now(), 'SUCCESS', $2)",
    )
    .bind(order_id)
    .bind(method.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(order_id, method = method.as_str(), "Payment confirmed");

    Ok(order_id)
}

fn bank_transfer_info(bank: &BankAccount, reference: &str) -> BankInfo {
    BankInfo {
        bank_name: bank.bank_name.clone(),
        account_no: Some(bank.account_no.clone()),
        account_name: bank.account_name.clone(),
        transfer_content: reference.to_string(),
    }
}

fn wallet_info(provider: &str, bank: &BankAccount, reference: &str) -> BankInfo {
    BankInfo {
        bank_name: provider.to_string(),
        account_no: None,
        account_name: bank.account_name.clone(),
        transfer_content: reference.to_string(),
    }
}

fn vietqr_url(
    bank_id: &str,
    account_no: &str,
    template: &str,
    amount: i64,
    reference: &str,
    account_name: &str,
) -> String {
    format!(
        "{}/{}-{}-{}.jpg?amount={}&addInfo={}&accountName={}",
        VIETQR_BASE,
        bank_id,
        account_no,
        template,
        amount,
        encode(reference),
        encode(account_name)
    )
}

fn wallet_fallback_url(cfg: &PaymentsConfig, bank_id: &str, amount: i64, reference: &str) -> String {
    vietqr_url(
        bank_id,
        &cfg.fallback_account_no,
        "compact",
        amount,
        reference,
        &cfg.bank.account_name,
    )
}

fn sign_hmac_sha256(key: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    to_hex(&mac.finalize().into_bytes())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// --- MoMo -----------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MomoCreateResponse {
    result_code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    pay_url: Option<String>,
    #[serde(default)]
    qr_code_url: Option<String>,
}

/// Canonical string the MoMo create request is signed over. Field order is
/// fixed by the provider.
fn momo_raw_signature(
    momo: &MomoConfig,
    amount: i64,
    ipn_url: &str,
    momo_order_id: &str,
    order_info: &str,
    redirect_url: &str,
    request_id: &str,
) -> String {
    format!(
        "accessKey={}&amount={}&extraData=&ipnUrl={}&orderId={}&orderInfo={}&partnerCode={}&redirectUrl={}&requestId={}&requestType=captureWallet",
        momo.access_key, amount, ipn_url, momo_order_id, order_info, momo.partner_code, redirect_url, request_id
    )
}

async fn request_momo_pay_url(
    state: &AppState,
    cfg: &PaymentsConfig,
    amount: i64,
    order_id: i64,
    reference: &str,
) -> Result<String, AppError> {
    let momo = &cfg.momo;
    let momo_order_id = format!("MOMO{}", order_id);
    let request_id = format!("MOMO{}{}", order_id, Utc::now().timestamp_millis());

    let raw = momo_raw_signature(
        momo,
        amount,
        &momo.ipn_url,
        &momo_order_id,
        reference,
        &cfg.redirect_url,
        &request_id,
    );
    let signature = sign_hmac_sha256(&momo.secret_key, &raw);

    let body = serde_json::json!({
        "partnerCode": momo.partner_code,
        "accessKey": momo.access_key,
        "requestId": request_id,
        "amount": amount.to_string(),
        "orderId": momo_order_id,
        "orderInfo": reference,
        "redirectUrl": cfg.redirect_url,
        "ipnUrl": momo.ipn_url,
        "requestType": "captureWallet",
        "extraData": "",
        "lang": "vi",
        "signature": signature,
    });

    let response: MomoCreateResponse = state
        .http
        .post(&momo.endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("MoMo request failed: {}", e)))?
        .json()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("MoMo response unreadable: {}", e)))?;

    if response.result_code != 0 {
        return Err(AppError::ExternalServiceError(format!(
            "MoMo rejected the request: {}",
            response.message.unwrap_or_else(|| "no message".to_string())
        )));
    }

    response
        .qr_code_url
        .or(response.pay_url)
        .ok_or_else(|| AppError::ExternalServiceError("MoMo returned no payment URL".to_string()))
}

// --- ZaloPay --------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ZaloPayCreateResponse {
    return_code: i64,
    #[serde(default)]
    return_message: Option<String>,
    #[serde(default)]
    order_url: Option<String>,
}

/// Pipe-joined MAC input of a ZaloPay create request. Field order is fixed
/// by the provider.
fn zalopay_mac_data(
    app_id: &str,
    app_trans_id: &str,
    app_user: &str,
    amount: i64,
    app_time: i64,
    embed_data: &str,
    item: &str,
) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        app_id, app_trans_id, app_user, amount, app_time, embed_data, item
    )
}

async fn request_zalopay_order_url(
    state: &AppState,
    cfg: &PaymentsConfig,
    amount: i64,
    order_id: i64,
    reference: &str,
) -> Result<String, AppError> {
    let zalo = &cfg.zalopay;
    let now = Utc::now();
    let app_time = now.timestamp_millis();
    let app_trans_id = format!("{}_{}", now.format("%Y%m%d"), app_time);
    let app_user = "user123";

    let embed_data = serde_json::json!({ "redirecturl": cfg.redirect_url }).to_string();
    let item = serde_json::json!([{
        "itemid": order_id.to_string(),
        "itemname": reference,
        "itemprice": amount,
        "itemquantity": 1,
    }])
    .to_string();

    let mac = sign_hmac_sha256(
        &zalo.key1,
        &zalopay_mac_data(
            &zalo.app_id,
            &app_trans_id,
            app_user,
            amount,
            app_time,
            &embed_data,
            &item,
        ),
    );

    let amount_str = amount.to_string();
    let app_time_str = app_time.to_string();
    let form: Vec<(&str, &str)> = vec![
        ("app_id", zalo.app_id.as_str()),
        ("app_trans_id", app_trans_id.as_str()),
        ("app_user", app_user),
        ("app_time", app_time_str.as_str()),
        ("item", item.as_str()),
        ("embed_data", embed_data.as_str()),
        ("amount", amount_str.as_str()),
        ("description", reference),
        ("bank_code", ""),
        ("callback_url", zalo.callback_url.as_str()),
        ("mac", mac.as_str()),
    ];

    let response: ZaloPayCreateResponse = state
        .http
        .post(&zalo.endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("ZaloPay request failed: {}", e)))?
        .json()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("ZaloPay response unreadable: {}", e)))?;

    if response.return_code != 1 {
        return Err(AppError::ExternalServiceError(format!(
            "ZaloPay rejected the request: {}",
            response
                .return_message
                .unwrap_or_else(|| "no message".to_string())
        )));
    }

    response
        .order_url
        .ok_or_else(|| AppError::ExternalServiceError("ZaloPay returned no order URL".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_reference_embeds_the_order_id() {
        assert_eq!(transfer_reference(42), "TICKETBOX 42");
    }

    #[test]
    fn vietqr_url_carries_amount_and_encoded_reference() {
        let url = vietqr_url(
            "970407",
            "131220056969",
            "print",
            450000,
            "TICKETBOX 42",
            "TRINH GIA HIEP",
        );

        assert!(url.starts_with("https://img.vietqr.io/image/970407-131220056969-print.jpg"));
        assert!(url.contains("amount=450000"));
        assert!(url.contains("addInfo=TICKETBOX%2042"));
        assert!(url.contains("accountName=TRINH%20GIA%20HIEP"));
    }

    #[test]
    fn momo_raw_signature_has_the_provider_field_order() {
        let momo = MomoConfig {
            partner_code: "MOMO".to_string(),
            access_key: "AK".to_string(),
            secret_key: "SK".to_string(),
            endpoint: "https://example.invalid".to_string(),
            ipn_url: "http://localhost:5000/ipn".to_string(),
        };

        let raw = momo_raw_signature(
            &momo,
            450000,
            &momo.ipn_url,
            "MOMO42",
            "TICKETBOX 42",
            "http://localhost:3000/payment-success",
            "MOMO42-req",
        );

        assert_eq!(
            raw,
            "accessKey=AK&amount=450000&extraData=&ipnUrl=http://localhost:5000/ipn\
             &orderId=MOMO42&orderInfo=TICKETBOX 42&partnerCode=MOMO\
             &redirectUrl=http://localhost:3000/payment-success&requestId=MOMO42-req\
             &requestType=captureWallet"
        );
    }

    #[test]
    fn zalopay_mac_data_is_pipe_joined_in_order() {
        let data = zalopay_mac_data("2553", "20260807_1", "user123", 450000, 1754500000000, "{}", "[]");
        assert_eq!(data, "2553|20260807_1|user123|450000|1754500000000|{}|[]");
    }

    #[test]
    fn hmac_signature_is_hex_and_deterministic() {
        let a = sign_hmac_sha256("key", "payload");
        let b = sign_hmac_sha256("key", "payload");
        let c = sign_hmac_sha256("key", "other payload");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
