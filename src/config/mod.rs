use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::security_header_layers;

/// Process-wide configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub payments: PaymentsConfig,
}

/// Constants handed to buyers in payment instructions. Wallet credentials
/// default to the providers' published sandbox values.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    pub bank: BankAccount,
    pub fallback_account_no: String,
    pub momo: MomoConfig,
    pub zalopay: ZaloPayConfig,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct BankAccount {
    pub bank_id: String,
    pub account_no: String,
    pub account_name: String,
    pub bank_name: String,
}

#[derive(Debug, Clone)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub ipn_url: String,
}

#[derive(Debug, Clone)]
pub struct ZaloPayConfig {
    pub app_id: String,
    pub key1: String,
    pub endpoint: String,
    pub callback_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/ticketbox".to_string()),
            port: parse_port(env::var("PORT").ok().as_deref()),
            payments: PaymentsConfig::from_env(),
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw.map(str::parse) {
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            tracing::warn!("Invalid PORT value, falling back to 5000");
            5000
        }
        None => 5000,
    }
}

impl PaymentsConfig {
    pub fn from_env() -> Self {
        Self {
            bank: BankAccount {
                bank_id: env_or("BANK_ID", "970407"),
                account_no: env_or("BANK_ACCOUNT_NO", "131220056969"),
                account_name: env_or("BANK_ACCOUNT_NAME", "TRINH GIA HIEP"),
                bank_name: env_or("BANK_NAME", "Techcombank"),
            },
            fallback_account_no: env_or("FALLBACK_ACCOUNT_NO", "0987654321"),
            momo: MomoConfig {
                partner_code: env_or("MOMO_PARTNER_CODE", "MOMO"),
                access_key: env_or("MOMO_ACCESS_KEY", "F8BBA842ECF85"),
                secret_key: env_or("MOMO_SECRET_KEY", "K951B6PE1waDMi640xX08PD3vg6EkVlz"),
                endpoint: env_or(
                    "MOMO_ENDPOINT",
                    "https://test-payment.momo.vn/v2/gateway/api/create",
                ),
                ipn_url: env_or(
                    "MOMO_IPN_URL",
                    "http://localhost:5000/api/payment/momo/callback",
                ),
            },
            zalopay: ZaloPayConfig {
                app_id: env_or("ZALOPAY_APP_ID", "2553"),
                key1: env_or("ZALOPAY_KEY1", "PcY4iZIKFCIdgZvA6ueMcMHHUbRLYjPL"),
                endpoint: env_or("ZALOPAY_ENDPOINT", "https://sb-openapi.zalopay.vn/v2/create"),
                callback_url: env_or(
                    "ZALOPAY_CALLBACK_URL",
                    "http://localhost:5000/api/payment/zalopay/callback",
                ),
            },
            redirect_url: env_or("PAYMENT_REDIRECT_URL", "http://localhost:3000/payment-success"),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_port_accepts_valid_values() {
        assert_eq!(parse_port(Some("8080")), 8080);
        assert_eq!(parse_port(Some("5000")), 5000);
    }

    #[test]
    fn parse_port_falls_back_on_garbage_or_absence() {
        assert_eq!(parse_port(Some("not-a-port")), 5000);
        assert_eq!(parse_port(Some("70000")), 5000);
        assert_eq!(parse_port(None), 5000);
    }
}
