//! RSASSA-PKCS1-v1_5 signing with SHA-1, the only scheme the gateway accepts.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use rsa::{
    pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
    BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::armor::{self, PUBLIC_KEY_LABEL, RSA_PRIVATE_KEY_LABEL};
use crate::error::{Error, KeyMaterialError, Result};
use crate::key_material::RsaKeyMaterial;
use crate::xml_key::XmlKeyComponents;

/// Length of a SHA-1 `DigestInfo`: 15 bytes of ASN.1 prefix plus the digest.
const DIGEST_INFO_LEN: usize = 15 + 20;

/// Minimum PKCS#1 v1.5 padding (`00 01 FF*8 00`).
const MIN_PADDING_LEN: usize = 11;

/// Holds a parsed private key and signs messages with it.
///
/// The key is never modified after construction, so one `Signer` can be
/// shared between threads.
pub struct Signer {
    key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("bits", &self.public_key.n().bits())
            .finish_non_exhaustive()
    }
}

impl Signer {
    /// Parse an `RSA PRIVATE KEY` PEM document.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = armor::unarmor(pem, RSA_PRIVATE_KEY_LABEL)
            .map_err(|e| KeyMaterialError::Malformed(e.to_string()))?;
        Self::from_key_material(&RsaKeyMaterial::from_pkcs1_der(&der)?)
    }

    /// Decode an XML key export (plain or base64-wrapped) and load it.
    pub fn from_xml_key(xml: &[u8]) -> Result<Self> {
        let components = XmlKeyComponents::decode(xml)?;
        let pem = RsaKeyMaterial::from_components(&components)?.to_pkcs1_pem()?;
        Self::from_pem(&pem)
    }

    /// Read an XML key export from disk and load it.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read(path)?;
        let signer = Self::from_xml_key(&xml)?;
        tracing::debug!(path = %path.display(), "loaded signing key");
        Ok(signer)
    }

    fn from_key_material(material: &RsaKeyMaterial) -> Result<Self> {
        let e = u64::try_from(material.e).map_err(|_| KeyMaterialError::ExponentOutOfRange)?;
        let key = RsaPrivateKey::from_components(
            material.n.clone(),
            BigUint::from(e),
            material.d.clone(),
            vec![material.p.clone(), material.q.clone()],
        )
        .map_err(|e| KeyMaterialError::Malformed(e.to_string()))?;
        key.validate()
            .map_err(|e| KeyMaterialError::Malformed(e.to_string()))?;

        let public_key = key.to_public_key();
        let signer = Self { key, public_key };
        if let Ok(key_id) = signer.key_id() {
            tracing::debug!(key_id = %key_id, bits = signer.public_key.n().bits(), "parsed RSA private key");
        }
        Ok(signer)
    }

    /// Sign the SHA-1 digest of `message`.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let size = self.public_key.size();
        if size < DIGEST_INFO_LEN + MIN_PADDING_LEN {
            return Err(Error::Signature(format!(
                "modulus of {} bytes is too small for a SHA-1 PKCS#1 v1.5 signature",
                size
            )));
        }

        let digest = Sha1::digest(message);
        self.key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(|e| Error::Signature(e.to_string()))
    }

    /// Standard padded base64 of [`Signer::sign`].
    pub fn sign_base64(&self, message: &[u8]) -> Result<String> {
        Ok(general_purpose::STANDARD.encode(self.sign(message)?))
    }

    /// Lowercase hex of [`Signer::sign`].
    pub fn sign_hex(&self, message: &[u8]) -> Result<String> {
        Ok(hex::encode(self.sign(message)?))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// The public half as a `PUBLIC KEY` (SubjectPublicKeyInfo) PEM document.
    pub fn public_key_pem(&self) -> Result<String> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyMaterialError::Malformed(e.to_string()).into())
    }

    /// SHA-256 fingerprint of the DER public key, as `sha256:<hex>`.
    pub fn key_id(&self) -> Result<String> {
        let der = self
            .public_key
            .to_public_key_der()
            .map_err(|e| KeyMaterialError::Malformed(e.to_string()))?;
        let hash = Sha256::digest(der.as_bytes());
        Ok(format!("sha256:{}", hex::encode(hash)))
    }
}

/// Parse a `PUBLIC KEY` PEM document holding an RSA key.
pub fn parse_public_key_pem(pem: &str) -> Result<RsaPublicKey> {
    let der = armor::unarmor(pem, PUBLIC_KEY_LABEL)?;
    RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| KeyMaterialError::Malformed(e.to_string()).into())
}

/// Check a PKCS#1 v1.5 SHA-1 signature over `message`.
///
/// Returns `Ok(false)` when the signature does not match.
pub fn verify_signature(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<bool> {
    let digest = Sha1::digest(message);
    match public_key.verify(Pkcs1v15Sign::new::<Sha1>(), &digest, signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
