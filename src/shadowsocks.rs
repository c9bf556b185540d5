//! Shadowsocks link decoder (SIP002)
//!
//! Link format: `ss://userinfo@hostname:port[/][?plugin=...][#tag]`
//!
//! **userinfo** is Base64 of `method:password`. URL-safe unpadded is the usual form;
//! padded and standard-alphabet encodings are accepted too. The decoded text must split
//! on `:` into exactly two parts; any other count is rejected as malformed.
//!
//! Two other spellings are accepted:
//! - plain userinfo `method:password@` (percent-encoded, as SIP002 allows for AEAD-2022);
//! - legacy `ss://base64(method:password@host:port)[#tag]`, where the whole body is encoded.

use crate::constants::{error_msg, scheme};
use crate::error::{DecodeError, Result};
use crate::profile::{ConnectionProfile, Identity, Protocol};
use crate::uri::LinkUri;
use base64::Engine;

pub(crate) fn decode(link: &str, uri: &LinkUri) -> Result<ConnectionProfile> {
    let username = uri.username();
    if username.is_empty() {
        return decode_legacy(link, uri);
    }

    let (method, password) = match uri.password() {
        Some(password) => split_credential(&format!("{}:{}", username, password))?,
        None => split_credential(&decode_base64(&username)?)?,
    };

    let mut profile = ConnectionProfile::new(
        Protocol::Shadowsocks,
        uri.host()?,
        uri.port()?,
        Identity::MethodPassword { method, password },
    );
    profile.plugin = uri.param("plugin");
    profile.remark = uri.fragment();

    Ok(profile)
}

fn decode_legacy(link: &str, uri: &LinkUri) -> Result<ConnectionProfile> {
    let body = link
        .get(scheme::SHADOWSOCKS.len()..)
        .and_then(|body| body.split(['#', '?']).next())
        .unwrap_or_default();

    let decoded = decode_base64(body.trim_end_matches('/'))?;
    let (credential, host_port) = decoded.rsplit_once('@').ok_or_else(|| {
        DecodeError::ShadowsocksCredentialMalformed(error_msg::INVALID_SS_FORMAT.to_string())
    })?;
    let (method, password) = split_credential(credential)?;

    let server = LinkUri::parse(&format!("{}{}", scheme::SHADOWSOCKS, host_port))?;
    let mut profile = ConnectionProfile::new(
        Protocol::Shadowsocks,
        server.host()?,
        server.port()?,
        Identity::MethodPassword { method, password },
    );
    profile.plugin = uri.param("plugin");
    profile.remark = uri.fragment();

    Ok(profile)
}

fn decode_base64(text: &str) -> Result<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};

    let bytes = URL_SAFE_NO_PAD
        .decode(text)
        .or_else(|_| URL_SAFE.decode(text))
        .or_else(|_| STANDARD_NO_PAD.decode(text))
        .or_else(|_| STANDARD.decode(text))?;
    String::from_utf8(bytes)
        .map_err(|e| DecodeError::Base64Invalid(format!("invalid UTF-8: {}", e)))
}

/// Splits `method:password`; exactly one `:` is allowed.
fn split_credential(credential: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = credential.split(':').collect();
    match parts.as_slice() {
        [method, password] => Ok((method.to_string(), password.to_string())),
        _ => Err(DecodeError::ShadowsocksCredentialMalformed(
            error_msg::INVALID_SS_FORMAT.to_string(),
        )),
    }
}
