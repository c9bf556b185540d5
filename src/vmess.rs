//! VMess link decoder
//!
//! ## Link format
//!
//! `vmess://base64(JSON)`: the body is Base64 (standard alphabet, padded or not)
//! of a JSON object. Whitespace, including pasted newlines, is removed before decoding.
//!
//! ## JSON fields
//!
//! | Key | Profile field |
//! |-----|---------------|
//! | `id` | UUID identity |
//! | `add` | address |
//! | `port` | port (string or number) |
//! | `net` | transport network |
//! | `type` | camouflage header type |
//! | `path`, `host` | transport path / host header |
//! | `tls` | TLS security |
//! | `sni`, `alpn` | TLS server name / ALPN |
//! | `fp`, else `fingerprint` | TLS fingerprint |
//! | `ps` | remark |
//!
//! A missing or wrong-typed key yields the empty string, never an error. Only
//! Base64 and JSON failures abort decoding.

use crate::constants::{error_msg, scheme};
use crate::error::{DecodeError, Result};
use crate::profile::{ConnectionProfile, Identity, Protocol, TlsSettings, Transport};
use base64::Engine;
use serde_json::{Map, Value};

pub(crate) fn decode(link: &str) -> Result<ConnectionProfile> {
    let body: String = link[scheme::VMESS.len()..]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(&body)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(&body))?;

    let value: Value = serde_json::from_slice(&decoded)?;
    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::JsonInvalid(error_msg::EXPECTED_OBJECT.to_string()))?;
    let field = |key: &str| string_field(object, key);

    let mut profile = ConnectionProfile::new(
        Protocol::VMess,
        field("add"),
        port_field(object),
        Identity::Uuid(field("id")),
    );
    profile.transport = Transport {
        network: field("net"),
        header_type: field("type"),
        path: field("path"),
        host: field("host"),
        ..Transport::default()
    };

    let fingerprint = match field("fp") {
        fp if !fp.is_empty() => fp,
        _ => field("fingerprint"),
    };
    profile.tls = TlsSettings {
        security: field("tls"),
        server_name: field("sni"),
        alpn: field("alpn"),
        fingerprint,
        ..TlsSettings::default()
    };
    profile.remark = field("ps");

    Ok(profile)
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Port may be a JSON string or number; anything else is empty.
fn port_field(object: &Map<String, Value>) -> String {
    match object.get("port") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
