//! # pasargad
//!
//! Request signing for the Pasargad (PEP) payment gateway.
//!
//! The gateway authenticates every API call with an RSA signature carried in
//! the `Sign` header. Merchants receive their private key as an XML
//! `<RSAKeyValue>` export, sometimes wrapped in an extra layer of base64. This
//! crate rebuilds the key from that export, re-encodes it as a standard
//! PKCS#1 container, and signs outbound request bodies with
//! RSASSA-PKCS1-v1_5 over SHA-1.
//!
//! ## Features
//!
//! - **XML key decoding**: plain or base64-wrapped `<RSAKeyValue>` documents
//! - **Key reconstruction**: PKCS#1 `RSAPrivateKey` DER and PEM, byte-identical
//!   to what standard tooling writes for the same key
//! - **Signing**: deterministic PKCS#1 v1.5 + SHA-1 signatures as raw bytes,
//!   base64 or hex
//! - **Gateway records**: typed requests and replies for token issuance,
//!   transaction checks, payment verification and refunds
//! - **Client** (`client` feature): async HTTP client for the four operations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pasargad::signer::Signer;
//!
//! let signer = Signer::from_key_file("certificate.xml").unwrap();
//! let signature = signer.sign_base64(br#"{"amount":15000}"#).unwrap();
//! println!("Sign: {}", signature);
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result`]. Key problems surface as
//! [`Error::Decode`], [`Error::LabelMismatch`] or [`Error::KeyMaterial`] when
//! the signer is built, never later; a key that fails once will fail the same
//! way on every retry.

pub mod armor;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod error;
pub mod key_material;
pub mod request;
pub mod signer;
pub mod types;
pub mod xml_key;

pub use error::{DecodeStage, Error, KeyMaterialError, Result};
pub use signer::Signer;
pub use xml_key::XmlKeyComponents;
