use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Decode error ({stage}): {message}")]
    Decode { stage: DecodeStage, message: String },

    #[error("Label mismatch: expected '{expected}', found '{found}'")]
    LabelMismatch { expected: String, found: String },

    #[error("Key material error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("Gateway error: {message}")]
    Gateway { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn decode(stage: DecodeStage, message: impl Into<String>) -> Self {
        Error::Decode {
            stage,
            message: message.into(),
        }
    }
}

/// Stage of the key pipeline at which a decode failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// A base64-wrapped XML key document: the wrapping decoded but the
    /// document inside it did not.
    Base64,
    /// The XML key document itself.
    Xml,
    /// PEM encapsulation boundaries or body.
    Armor,
}

impl std::fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecodeStage::Base64 => "base64",
            DecodeStage::Xml => "xml",
            DecodeStage::Armor => "armor",
        };
        write!(f, "{}", s)
    }
}

/// Failures while turning key components into usable RSA key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("component '{0}' is missing or empty")]
    MissingComponent(&'static str),

    #[error("component '{component}' is not valid base64: {message}")]
    InvalidBase64 {
        component: &'static str,
        message: String,
    },

    #[error("public exponent does not fit in a signed 64-bit integer")]
    ExponentOutOfRange,

    #[error("malformed private key: {0}")]
    Malformed(String),
}
