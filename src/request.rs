//! Signing of outbound request bodies and interpretation of gateway replies.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::signer::Signer;
use crate::types::payment::{ErrorResponse, GatewayResponse};

/// A serialized request body together with the signature over exactly
/// those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub body: Vec<u8>,
    /// Base64 signature, sent in the `Sign` header.
    pub signature: String,
}

/// Serialize `request` to JSON once and sign the result.
pub fn sign_payload<T: Serialize>(signer: &Signer, request: &T) -> Result<SignedPayload> {
    let body = serde_json::to_vec(request)?;
    let signature = signer.sign_base64(&body)?;
    Ok(SignedPayload { body, signature })
}

/// Turn an HTTP status and body into the expected reply record.
///
/// Non-200 replies carry an [`ErrorResponse`]; a 200 reply whose
/// `IsSuccess` flag is false is also an error.
pub fn interpret<T>(status: u16, body: &[u8]) -> Result<T>
where
    T: GatewayResponse + DeserializeOwned,
{
    if status != 200 {
        let err: ErrorResponse = serde_json::from_slice(body)?;
        tracing::warn!(status, message = %err.message, "gateway rejected request");
        return Err(Error::Gateway {
            message: err.message,
        });
    }

    let resp: T = serde_json::from_slice(body)?;
    if !resp.is_success() {
        tracing::warn!(message = %resp.message(), "gateway reported failure");
        return Err(Error::Gateway {
            message: resp.message().to_string(),
        });
    }
    Ok(resp)
}

/// Address the buyer is sent to after a token has been issued.
pub fn payment_url(base_url: &str, token: &str) -> String {
    format!("{}/payment.aspx?n={}", base_url.trim_end_matches('/'), token)
}
