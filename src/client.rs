//! Async client for the four gateway operations.
//!
//! Every call follows the same sequence: build the wire request, serialize
//! and sign it, post it with the signature in the `Sign` header, then
//! interpret the reply.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{
    GatewayConfig, CHECK_TRANSACTION_PATH, GET_TOKEN_PATH, REFUND_PATH, VERIFY_PAYMENT_PATH,
};
use crate::error::Result;
use crate::request::{interpret, payment_url, sign_payload};
use crate::signer::Signer;
use crate::types::payment::{
    timestamp, CheckTransactionResponse, GatewayResponse, Merchant, Payment, PaymentVerification,
    RedirectResponse, Refund, RefundResponse, TransactionQuery, VerifyPaymentResponse,
};

/// Header carrying the base64 request signature.
pub const SIGN_HEADER: &str = "Sign";

/// Posts a signed JSON body and returns the raw reply.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: Vec<u8>, signature: &str) -> Result<(u16, Vec<u8>)>;
}

/// [`Transport`] backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>, signature: &str) -> Result<(u16, Vec<u8>)> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(SIGN_HEADER, signature)
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}

pub struct PasargadClient<T: Transport = ReqwestTransport> {
    config: GatewayConfig,
    merchant: Merchant,
    signer: Signer,
    transport: T,
}

impl PasargadClient<ReqwestTransport> {
    /// Load the signing key from `config.key_path` and build an HTTP client.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> PasargadClient<T> {
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        let signer = Signer::from_key_file(&config.key_path)?;
        Ok(Self::with_signer(config, signer, transport))
    }

    pub fn with_signer(config: GatewayConfig, signer: Signer, transport: T) -> Self {
        let merchant = config.merchant();
        Self {
            config,
            merchant,
            signer,
            transport,
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Request a payment token and return the URL the buyer should visit.
    pub async fn redirect(&self, payment: Payment) -> Result<String> {
        let request = payment.into_request(&self.merchant, &timestamp());
        let resp: RedirectResponse = self.call(GET_TOKEN_PATH, &request).await?;
        Ok(payment_url(&self.config.base_url, &resp.token))
    }

    pub async fn check_transaction(&self, query: TransactionQuery) -> Result<CheckTransactionResponse> {
        let request = query.into_request(&self.merchant);
        self.call(CHECK_TRANSACTION_PATH, &request).await
    }

    pub async fn verify_payment(&self, verification: PaymentVerification) -> Result<VerifyPaymentResponse> {
        let request = verification.into_request(&self.merchant, &timestamp());
        self.call(VERIFY_PAYMENT_PATH, &request).await
    }

    pub async fn refund(&self, refund: Refund) -> Result<RefundResponse> {
        let request = refund.into_request(&self.merchant, &timestamp());
        self.call(REFUND_PATH, &request).await
    }

    async fn call<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: GatewayResponse + DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let signed = sign_payload(&self.signer, request)?;
        tracing::debug!(url = %url, bytes = signed.body.len(), "posting signed request");

        let (status, body) = self
            .transport
            .post_json(&url, signed.body, &signed.signature)
            .await?;
        interpret(status, &body)
    }
}
