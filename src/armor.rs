//! PEM armor (RFC 7468) for DER key containers.

use pem_rfc7468::LineEnding;

use crate::error::{DecodeStage, Error, Result};

/// Label of a PKCS#1 `RSAPrivateKey` container.
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// Label of an X.509 `SubjectPublicKeyInfo` container.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DELIMITER: &str = "-----";

/// Wrap `payload` in PEM boundaries carrying `label`.
///
/// Base64 lines are 64 columns wide, lines end in LF and the document ends
/// with a newline.
pub fn armor(payload: &[u8], label: &str) -> Result<String> {
    pem_rfc7468::encode_string(label, LineEnding::LF, payload)
        .map_err(|e| Error::decode(DecodeStage::Armor, format!("cannot armor '{}': {}", label, e)))
}

/// Extract the payload of the first PEM block in `text`.
///
/// An empty `expected_label` accepts any label.
pub fn unarmor(text: &str, expected_label: &str) -> Result<Vec<u8>> {
    let (label, payload) = unarmor_any(text)?;
    if !expected_label.is_empty() && label != expected_label {
        return Err(Error::LabelMismatch {
            expected: expected_label.to_string(),
            found: label,
        });
    }
    Ok(payload)
}

/// Extract the label and payload of the first PEM block in `text`.
///
/// Text before the block and after its end boundary is ignored. A block
/// whose body is blank carries an empty payload, which is what [`armor`]
/// writes for empty input.
pub fn unarmor_any(text: &str) -> Result<(String, Vec<u8>)> {
    let block = first_block(text)?;
    if block.body.trim().is_empty() {
        return Ok((block.label.to_string(), Vec::new()));
    }
    let (label, payload) = pem_rfc7468::decode_vec(block.text.as_bytes())
        .map_err(|e| Error::decode(DecodeStage::Armor, e.to_string()))?;
    Ok((label.to_string(), payload))
}

/// First `BEGIN`/`END` pair found in a document.
struct Block<'a> {
    label: &'a str,
    /// Boundaries included.
    text: &'a str,
    /// Everything between the two boundaries.
    body: &'a str,
}

fn first_block(text: &str) -> Result<Block<'_>> {
    let start = text
        .find(BEGIN)
        .ok_or_else(|| Error::decode(DecodeStage::Armor, "no PEM block found"))?;
    let rest = &text[start + BEGIN.len()..];
    let label_len = rest
        .find(DELIMITER)
        .ok_or_else(|| Error::decode(DecodeStage::Armor, "unterminated BEGIN boundary"))?;
    let label = &rest[..label_len];
    let body_at = label_len + DELIMITER.len();

    let footer = format!("{}{}{}", END, label, DELIMITER);
    let footer_at = rest[body_at..]
        .find(&footer)
        .map(|at| body_at + at)
        .ok_or_else(|| Error::decode(DecodeStage::Armor, format!("missing END boundary for '{}'", label)))?;
    let end = start + BEGIN.len() + footer_at + footer.len();
    Ok(Block {
        label,
        text: &text[start..end],
        body: &rest[body_at..footer_at],
    })
}
