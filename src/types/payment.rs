use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Action code for a purchase.
pub const ACTION_PAYMENT: &str = "1003";

/// Timestamp layout expected by the gateway (`2006/01/02 15:04:05`).
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Format `time` the way the gateway expects request timestamps.
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time as a request timestamp.
pub fn timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Merchant identity stamped on every outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub merchant_code: i64,
    pub terminal_code: i64,
    pub redirect_url: String,
}

// ---------------------------------------------------------------------------
// Caller inputs
// ---------------------------------------------------------------------------

/// A purchase to open on the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payment {
    pub amount: i64,
    pub invoice_number: String,
    pub invoice_date: String,
    pub mobile: String,
    pub email: String,
}

impl Payment {
    pub fn into_request(self, merchant: &Merchant, time_stamp: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: self.amount,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            action: ACTION_PAYMENT.to_string(),
            mobile: self.mobile,
            email: self.email,
            merchant_code: merchant.merchant_code,
            terminal_code: merchant.terminal_code,
            redirect_address: merchant.redirect_url.clone(),
            time_stamp: time_stamp.to_string(),
        }
    }
}

/// Lookup of a finished transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub transaction_reference_id: String,
    pub invoice_number: String,
    pub invoice_date: String,
}

impl TransactionQuery {
    pub fn into_request(self, merchant: &Merchant) -> CheckTransactionRequest {
        CheckTransactionRequest {
            transaction_reference_id: self.transaction_reference_id,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            terminal_code: merchant.terminal_code,
            merchant_code: merchant.merchant_code,
        }
    }
}

/// Confirmation that a paid invoice should be settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentVerification {
    pub amount: i64,
    pub invoice_number: String,
    pub invoice_date: String,
}

impl PaymentVerification {
    pub fn into_request(self, merchant: &Merchant, time_stamp: &str) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            amount: self.amount,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            terminal_code: merchant.terminal_code,
            merchant_code: merchant.merchant_code,
            time_stamp: time_stamp.to_string(),
        }
    }
}

/// Refund of a settled invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refund {
    pub invoice_number: String,
    pub invoice_date: String,
}

impl Refund {
    pub fn into_request(self, merchant: &Merchant, time_stamp: &str) -> RefundRequest {
        RefundRequest {
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            terminal_code: merchant.terminal_code,
            merchant_code: merchant.merchant_code,
            time_stamp: time_stamp.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: i64,
    pub invoice_number: String,
    pub invoice_date: String,
    pub action: String,
    pub mobile: String,
    pub email: String,
    pub merchant_code: i64,
    pub terminal_code: i64,
    pub redirect_address: String,
    pub time_stamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckTransactionRequest {
    #[serde(rename = "transactionReferenceID")]
    pub transaction_reference_id: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub terminal_code: i64,
    pub merchant_code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub amount: i64,
    pub invoice_number: String,
    pub invoice_date: String,
    pub terminal_code: i64,
    pub merchant_code: i64,
    pub time_stamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub invoice_number: String,
    pub invoice_date: String,
    pub terminal_code: i64,
    pub merchant_code: i64,
    pub time_stamp: String,
}

// ---------------------------------------------------------------------------
// Wire responses
// ---------------------------------------------------------------------------

/// Common shape of every gateway reply.
pub trait GatewayResponse {
    fn is_success(&self) -> bool;
    fn message(&self) -> &str;
}

/// Body of a non-200 reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorResponse {
    pub is_success: bool,
    pub message: String,
}

/// Reply to a token request; `token` is only set on success.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct RedirectResponse {
    pub is_success: bool,
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct CheckTransactionResponse {
    pub is_success: bool,
    pub message: String,
    pub reference_number: i64,
    pub trace_number: i64,
    pub transaction_date: String,
    pub action: String,
    #[serde(rename = "TransactionReferenceID")]
    pub transaction_reference_id: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub merchant_code: i64,
    pub terminal_code: i64,
    #[serde(rename = "amount")]
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct VerifyPaymentResponse {
    pub is_success: bool,
    pub message: String,
    /// e.g. `5022-29**-****-2328`
    pub masked_card_number: String,
    pub hashed_card_number: String,
    pub shaparak_ref_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct RefundResponse {
    pub is_success: bool,
    pub message: String,
}

macro_rules! impl_gateway_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GatewayResponse for $ty {
                fn is_success(&self) -> bool {
                    self.is_success
                }

                fn message(&self) -> &str {
                    &self.message
                }
            }
        )*
    };
}

impl_gateway_response!(
    ErrorResponse,
    RedirectResponse,
    CheckTransactionResponse,
    VerifyPaymentResponse,
    RefundResponse,
);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn merchant() -> Merchant {
        Merchant {
            merchant_code: 4481346,
            terminal_code: 1712345,
            redirect_url: "https://shop.example/callback".to_string(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        let time = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&time), "2023/01/02 03:04:05");

        let tehran = FixedOffset::east_opt(3 * 3600 + 1800).unwrap();
        assert_eq!(
            format_timestamp(&time.with_timezone(&tehran)),
            "2023/01/02 06:34:05"
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "/");
        assert_eq!(&ts[10..11], " ");
    }

    #[test]
    fn test_payment_into_request() {
        let payment = Payment {
            amount: 15000,
            invoice_number: "4029".to_string(),
            invoice_date: "2023/01/02".to_string(),
            mobile: "09120000000".to_string(),
            email: "buyer@example.com".to_string(),
        };
        let request = payment.into_request(&merchant(), "2023/01/02 03:04:05");
        assert_eq!(request.action, ACTION_PAYMENT);
        assert_eq!(request.merchant_code, 4481346);
        assert_eq!(request.terminal_code, 1712345);
        assert_eq!(request.redirect_address, "https://shop.example/callback");
        assert_eq!(request.time_stamp, "2023/01/02 03:04:05");
    }

    #[test]
    fn test_create_payment_wire_names() {
        let request = Payment {
            amount: 1,
            ..Default::default()
        }
        .into_request(&merchant(), "ts");
        let json = serde_json::to_value(&request).unwrap();
        for key in [
            "amount",
            "invoiceNumber",
            "invoiceDate",
            "action",
            "mobile",
            "email",
            "merchantCode",
            "terminalCode",
            "redirectAddress",
            "timeStamp",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_check_transaction_wire_names() {
        let request = TransactionQuery {
            transaction_reference_id: "636817366166357302".to_string(),
            invoice_number: "4029".to_string(),
            invoice_date: "2023/01/02".to_string(),
        }
        .into_request(&merchant());
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"transactionReferenceID":"636817366166357302","invoiceNumber":"4029","invoiceDate":"2023/01/02","terminalCode":1712345,"merchantCode":4481346}"#
        );
    }

    #[test]
    fn test_verify_and_refund_requests() {
        let verify = PaymentVerification {
            amount: 15000,
            invoice_number: "4029".to_string(),
            invoice_date: "2023/01/02".to_string(),
        }
        .into_request(&merchant(), "2023/01/02 03:04:05");
        assert_eq!(
            serde_json::to_string(&verify).unwrap(),
            r#"{"amount":15000,"invoiceNumber":"4029","invoiceDate":"2023/01/02","terminalCode":1712345,"merchantCode":4481346,"timeStamp":"2023/01/02 03:04:05"}"#
        );

        let refund = Refund {
            invoice_number: "4029".to_string(),
            invoice_date: "2023/01/02".to_string(),
        }
        .into_request(&merchant(), "2023/01/02 03:04:05");
        assert_eq!(refund.merchant_code, 4481346);
        assert_eq!(refund.time_stamp, "2023/01/02 03:04:05");
    }

    #[test]
    fn test_check_transaction_response_parses() {
        let json = r#"{
            "IsSuccess": true,
            "Message": "OK",
            "ReferenceNumber": 100200300,
            "TraceNumber": 4455,
            "TransactionDate": "2023/01/02 03:04:05",
            "Action": "1003",
            "TransactionReferenceID": "636817366166357302",
            "InvoiceNumber": "4029",
            "InvoiceDate": "2023/01/02",
            "MerchantCode": 4481346,
            "TerminalCode": 1712345,
            "amount": 15000
        }"#;
        let resp: CheckTransactionResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.message(), "OK");
        assert_eq!(resp.transaction_reference_id, "636817366166357302");
        assert_eq!(resp.amount, 15000);
    }

    #[test]
    fn test_sparse_responses_default() {
        let resp: RedirectResponse =
            serde_json::from_str(r#"{"IsSuccess": false, "Message": "invalid sign"}"#).unwrap();
        assert!(!resp.is_success());
        assert!(resp.token.is_empty());

        let resp: VerifyPaymentResponse = serde_json::from_str(
            r#"{"IsSuccess": true, "Message": "", "MaskedCardNumber": "5022-29**-****-2328", "ShaparakRefNumber": "100200300400500"}"#,
        )
        .unwrap();
        assert_eq!(resp.masked_card_number, "5022-29**-****-2328");
        assert!(resp.hashed_card_number.is_empty());
    }
}
