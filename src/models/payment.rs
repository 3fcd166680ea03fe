use serde::Serialize;

/// Supported payment instruction methods. Anything else is rejected before
/// touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "BANK_TRANSFER")]
    BankTransfer,
    #[serde(rename = "MOMO")]
    Momo,
    #[serde(rename = "ZALOPAY")]
    ZaloPay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Momo => "MOMO",
            PaymentMethod::ZaloPay => "ZALOPAY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BANK_TRANSFER" => Some(PaymentMethod::BankTransfer),
            "MOMO" => Some(PaymentMethod::Momo),
            "ZALOPAY" => Some(PaymentMethod::ZaloPay),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for method in [
            PaymentMethod::BankTransfer,
            PaymentMethod::Momo,
            PaymentMethod::ZaloPay,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("PAYPAL"), None);
    }
}
