//! Reconstruction of RSA private key material from XML key components and
//! its PKCS#1 `RSAPrivateKey` encoding.

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs1::{
    self,
    der::{asn1::UintRef, Decode, Encode},
};
use rsa::BigUint;

use crate::armor::{self, RSA_PRIVATE_KEY_LABEL};
use crate::error::{KeyMaterialError, Result};
use crate::xml_key::XmlKeyComponents;

/// CRT parameters of one additional prime in a multi-prime key.
#[derive(Clone, PartialEq, Eq)]
pub struct CrtValue {
    pub prime: BigUint,
    pub exponent: BigUint,
    pub coefficient: BigUint,
}

/// A complete RSA private key, component by component.
///
/// Values are carried exactly as supplied; nothing here checks that
/// `n == p * q` or that `e` and `d` are inverses.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaKeyMaterial {
    pub n: BigUint,
    pub e: i64,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    /// `d mod (p - 1)`
    pub dp: BigUint,
    /// `d mod (q - 1)`
    pub dq: BigUint,
    /// `q^-1 mod p`
    pub qinv: BigUint,
    /// Always empty for keys built here.
    pub additional_primes: Vec<CrtValue>,
}

impl std::fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyMaterial")
            .field("bits", &self.n.bits())
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

impl RsaKeyMaterial {
    /// Decode all eight components into integers.
    ///
    /// Every component must be present and valid base64.
    pub fn from_components(components: &XmlKeyComponents) -> Result<Self> {
        Ok(Self {
            n: component("Modulus", &components.modulus)?,
            e: public_exponent(&decode_component("Exponent", &components.exponent)?)?,
            d: component("D", &components.d)?,
            p: component("P", &components.p)?,
            q: component("Q", &components.q)?,
            dp: component("DP", &components.dp)?,
            dq: component("DQ", &components.dq)?,
            qinv: component("InverseQ", &components.inverse_q)?,
            additional_primes: Vec::new(),
        })
    }

    /// Parse a DER `RSAPrivateKey` back into components.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let key = pkcs1::RsaPrivateKey::from_der(der).map_err(malformed)?;
        if key.version() != pkcs1::Version::TwoPrime {
            return Err(KeyMaterialError::Malformed("multi-prime keys are not supported".into()).into());
        }
        let uint = |v: UintRef| BigUint::from_bytes_be(v.as_bytes());

        Ok(Self {
            n: uint(key.modulus),
            e: public_exponent(key.public_exponent.as_bytes())?,
            d: uint(key.private_exponent),
            p: uint(key.prime1),
            q: uint(key.prime2),
            dp: uint(key.exponent1),
            dq: uint(key.exponent2),
            qinv: uint(key.coefficient),
            additional_primes: Vec::new(),
        })
    }

    /// Serialize as a DER `RSAPrivateKey` (version 0, two primes).
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        if !self.additional_primes.is_empty() {
            return Err(KeyMaterialError::Malformed("multi-prime keys are not supported".into()).into());
        }

        let n = self.n.to_bytes_be();
        let e = self.e.to_be_bytes();
        let d = self.d.to_bytes_be();
        let p = self.p.to_bytes_be();
        let q = self.q.to_bytes_be();
        let dp = self.dp.to_bytes_be();
        let dq = self.dq.to_bytes_be();
        let qinv = self.qinv.to_bytes_be();

        let key = pkcs1::RsaPrivateKey {
            modulus: UintRef::new(&n).map_err(malformed)?,
            public_exponent: UintRef::new(&e).map_err(malformed)?,
            private_exponent: UintRef::new(&d).map_err(malformed)?,
            prime1: UintRef::new(&p).map_err(malformed)?,
            prime2: UintRef::new(&q).map_err(malformed)?,
            exponent1: UintRef::new(&dp).map_err(malformed)?,
            exponent2: UintRef::new(&dq).map_err(malformed)?,
            coefficient: UintRef::new(&qinv).map_err(malformed)?,
            other_prime_infos: None,
        };
        Ok(key.to_der().map_err(malformed)?)
    }

    /// Serialize and armor as an `RSA PRIVATE KEY` PEM document.
    pub fn to_pkcs1_pem(&self) -> Result<String> {
        armor::armor(&self.to_pkcs1_der()?, RSA_PRIVATE_KEY_LABEL)
    }
}

/// Rebuild the private key described by `components` as PKCS#1 PEM text.
pub fn build_private_key_pem(components: &XmlKeyComponents) -> Result<String> {
    RsaKeyMaterial::from_components(components)?.to_pkcs1_pem()
}

/// Line breaks and indentation inside a component are not part of its value.
fn decode_component(name: &'static str, value: &str) -> Result<Vec<u8>> {
    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(KeyMaterialError::MissingComponent(name).into());
    }
    let bytes = general_purpose::STANDARD
        .decode(&compact)
        .map_err(|e| KeyMaterialError::InvalidBase64 {
            component: name,
            message: e.to_string(),
        })?;
    if bytes.is_empty() {
        return Err(KeyMaterialError::MissingComponent(name).into());
    }
    Ok(bytes)
}

fn component(name: &'static str, value: &str) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(&decode_component(name, value)?))
}

/// Big-endian unsigned bytes to `i64`, rejecting anything above `i64::MAX`.
fn public_exponent(bytes: &[u8]) -> Result<i64> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let significant = &bytes[start..];
    if significant.len() > 8 {
        return Err(KeyMaterialError::ExponentOutOfRange.into());
    }
    let mut buf = [0u8; 8];
    buf[8 - significant.len()..].copy_from_slice(significant);
    i64::try_from(u64::from_be_bytes(buf)).map_err(|_| KeyMaterialError::ExponentOutOfRange.into())
}

fn malformed(err: impl std::fmt::Display) -> KeyMaterialError {
    KeyMaterialError::Malformed(err.to_string())
}
