//! Decoding of the gateway's XML key export (`<RSAKeyValue>` documents).

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeStage, Error, Result};

/// The eight base64 fields of an exported RSA private key.
///
/// Each field is the base64 text of an unsigned big-endian integer. Elements
/// absent from the document decode to an empty string; presence is enforced
/// later, when the components are turned into key material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlKeyComponents {
    #[serde(rename = "Modulus", default)]
    pub modulus: String,
    #[serde(rename = "Exponent", default)]
    pub exponent: String,
    #[serde(rename = "P", default)]
    pub p: String,
    #[serde(rename = "Q", default)]
    pub q: String,
    #[serde(rename = "DP", default)]
    pub dp: String,
    #[serde(rename = "DQ", default)]
    pub dq: String,
    #[serde(rename = "InverseQ", default)]
    pub inverse_q: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

impl XmlKeyComponents {
    /// Decode a key document given either as plain XML or as XML wrapped in
    /// one extra layer of base64.
    ///
    /// The base64 form wins when it decodes to a parseable document;
    /// otherwise the input is parsed as-is.
    pub fn decode(input: &[u8]) -> Result<Self> {
        let unwrapped = match unwrap_base64(input) {
            Ok(decoded) => match parse_xml(&decoded) {
                Ok(components) => {
                    tracing::debug!("decoded base64-wrapped XML key document");
                    return Ok(components);
                }
                Err(e) => Some(e),
            },
            Err(_) => None,
        };

        parse_xml(input).map_err(|plain| match (unwrapped, plain) {
            // Valid base64 is never an XML document, so the unwrapped
            // document's failure is the one worth reporting.
            (Some(Error::Decode { message: inner, .. }), Error::Decode { message, .. }) => {
                Error::decode(
                    DecodeStage::Base64,
                    format!(
                        "base64-unwrapped document is not an XML key: {} (as plain XML: {})",
                        inner, message
                    ),
                )
            }
            (_, plain) => plain,
        })
    }

    /// Iterate the components in document order, paired with element names.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("Modulus", self.modulus.as_str()),
            ("Exponent", self.exponent.as_str()),
            ("P", self.p.as_str()),
            ("Q", self.q.as_str()),
            ("DP", self.dp.as_str()),
            ("DQ", self.dq.as_str()),
            ("InverseQ", self.inverse_q.as_str()),
            ("D", self.d.as_str()),
        ]
    }
}

fn unwrap_base64(input: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(Error::decode(DecodeStage::Base64, "empty input"));
    }
    general_purpose::STANDARD
        .decode(&compact)
        .map_err(|e| Error::decode(DecodeStage::Base64, e.to_string()))
}

/// Wire shape of `<RSAKeyValue>`. Repeated elements are collected so the
/// last occurrence can win.
#[derive(Deserialize)]
struct RawKeyDocument {
    #[serde(rename = "Modulus", default)]
    modulus: Vec<String>,
    #[serde(rename = "Exponent", default)]
    exponent: Vec<String>,
    #[serde(rename = "P", default)]
    p: Vec<String>,
    #[serde(rename = "Q", default)]
    q: Vec<String>,
    #[serde(rename = "DP", default)]
    dp: Vec<String>,
    #[serde(rename = "DQ", default)]
    dq: Vec<String>,
    #[serde(rename = "InverseQ", default)]
    inverse_q: Vec<String>,
    #[serde(rename = "D", default)]
    d: Vec<String>,
}

fn last_trimmed(values: Vec<String>) -> String {
    values
        .last()
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn parse_xml(bytes: &[u8]) -> Result<XmlKeyComponents> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::decode(DecodeStage::Xml, format!("not UTF-8: {}", e)))?;
    let text = text.trim_start_matches('\u{feff}');
    if !text.trim_start().starts_with('<') {
        return Err(Error::decode(DecodeStage::Xml, "not an XML document"));
    }
    let raw: RawKeyDocument =
        quick_xml::de::from_str(text).map_err(|e| Error::decode(DecodeStage::Xml, e.to_string()))?;

    Ok(XmlKeyComponents {
        modulus: last_trimmed(raw.modulus),
        exponent: last_trimmed(raw.exponent),
        p: last_trimmed(raw.p),
        q: last_trimmed(raw.q),
        dp: last_trimmed(raw.dp),
        dq: last_trimmed(raw.dq),
        inverse_q: last_trimmed(raw.inverse_q),
        d: last_trimmed(raw.d),
    })
}
