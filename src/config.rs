//! Gateway client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::payment::Merchant;

pub const DEFAULT_BASE_URL: &str = "https://pep.shaparak.ir";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const GET_TOKEN_PATH: &str = "/Api/v1/Payment/GetToken";
pub const CHECK_TRANSACTION_PATH: &str = "/Api/v1/Payment/CheckTransactionResult";
pub const VERIFY_PAYMENT_PATH: &str = "/Api/v1/Payment/VerifyPayment";
pub const REFUND_PATH: &str = "/Api/v1/Payment/RefundPayment";

/// Merchant credentials, callback address and key location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    pub merchant_code: i64,
    pub terminal_code: i64,
    pub redirect_url: String,
    /// XML key export, plain or base64-wrapped.
    pub key_path: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl GatewayConfig {
    pub fn new(
        merchant_code: i64,
        terminal_code: i64,
        redirect_url: &str,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            merchant_code,
            terminal_code,
            redirect_url: redirect_url.to_string(),
            key_path: key_path.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn merchant(&self) -> Merchant {
        Merchant {
            merchant_code: self.merchant_code,
            terminal_code: self.terminal_code,
            redirect_url: self.redirect_url.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL of an API path on the configured gateway.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "merchant_code": 4481346,
            "terminal_code": 1712345,
            "redirect_url": "https://shop.example/callback",
            "key_path": "/etc/pasargad/certificate.xml"
        }"#;
        let config = GatewayConfig::from_json(json).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.key_path, PathBuf::from("/etc/pasargad/certificate.xml"));
    }

    #[test]
    fn test_endpoints() {
        let mut config = GatewayConfig::new(1, 2, "https://shop.example", "key.xml");
        assert_eq!(
            config.endpoint(GET_TOKEN_PATH),
            "https://pep.shaparak.ir/Api/v1/Payment/GetToken"
        );
        config.base_url = "http://localhost:8080/".to_string();
        assert_eq!(
            config.endpoint(REFUND_PATH),
            "http://localhost:8080/Api/v1/Payment/RefundPayment"
        );
    }

    #[test]
    fn test_merchant() {
        let config = GatewayConfig::new(4481346, 1712345, "https://shop.example/cb", "key.xml");
        let merchant = config.merchant();
        assert_eq!(merchant.merchant_code, 4481346);
        assert_eq!(merchant.terminal_code, 1712345);
        assert_eq!(merchant.redirect_url, "https://shop.example/cb");
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        let config = GatewayConfig::new(1, 2, "https://shop.example", "key.xml");
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(GatewayConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_field_is_json_error() {
        assert!(matches!(
            GatewayConfig::from_json(r#"{"merchant_code": 1}"#),
            Err(Error::Json(_))
        ));
    }
}
