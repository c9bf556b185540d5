//! Error types for link decoding and config synthesis
//!
//! Decoding and synthesis fail independently, so each stage has its own enum:
//! - **DecodeError**: the share link could not be turned into a [`ConnectionProfile`](crate::ConnectionProfile).
//! - **SynthesisError**: a profile could not be turned into a document for one target.
//!
//! Every variant carries a human-readable message for the caller to show.

use std::fmt;

/// Result type defaulting to [`DecodeError`]
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Errors that can occur while decoding a share link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// VMess payload (or Shadowsocks userinfo) is not valid Base64
    Base64Invalid(String),
    /// VMess Base64 payload is not a valid JSON object
    JsonInvalid(String),
    /// Generic URI syntax failure, including a missing host or port
    UriInvalid(String),
    /// Scheme is not one of vmess, vless, ss, trojan
    UnsupportedProtocol(String),
    /// Decoded Shadowsocks userinfo does not split into method and password
    ShadowsocksCredentialMalformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Base64Invalid(msg) => write!(f, "Base64 decode error: {}", msg),
            DecodeError::JsonInvalid(msg) => write!(f, "JSON parse error: {}", msg),
            DecodeError::UriInvalid(msg) => write!(f, "URI parse error: {}", msg),
            DecodeError::UnsupportedProtocol(msg) => write!(f, "Unsupported protocol: {}", msg),
            DecodeError::ShadowsocksCredentialMalformed(msg) => {
                write!(f, "Malformed Shadowsocks credential: {}", msg)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::Base64Invalid(err.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::JsonInvalid(err.to_string())
    }
}

impl From<url::ParseError> for DecodeError {
    fn from(err: url::ParseError) -> Self {
        DecodeError::UriInvalid(err.to_string())
    }
}

/// Errors that can occur while building a target document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// No builder is registered for the profile's protocol
    UnsupportedProtocol(String),
    /// Port is not an integer in 1–65535
    InvalidPort(String),
    /// Identity variant does not belong to the profile's protocol
    IdentityMismatch(String),
    /// Document could not be encoded as JSON
    Serialization(String),
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::UnsupportedProtocol(msg) => write!(f, "Unsupported protocol: {}", msg),
            SynthesisError::InvalidPort(msg) => write!(f, "Invalid port: {}", msg),
            SynthesisError::IdentityMismatch(msg) => write!(f, "Identity mismatch: {}", msg),
            SynthesisError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for SynthesisError {}

impl From<serde_json::Error> for SynthesisError {
    fn from(err: serde_json::Error) -> Self {
        SynthesisError::Serialization(err.to_string())
    }
}
