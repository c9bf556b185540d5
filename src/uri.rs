//! Generic URI handling shared by the `vless://`, `ss://` and `trojan://` decoders.
//!
//! Links are parsed with [`url::Url`]; userinfo and fragment come back
//! percent-encoded and are decoded here. Query parameters are read as
//! `application/x-www-form-urlencoded`, names case-sensitive.

use crate::constants::error_msg;
use crate::error::{DecodeError, Result};
use crate::profile::{TlsSettings, Transport};
use std::collections::HashMap;
use url::Url;

/// A parsed link with its query parameters collected.
pub(crate) struct LinkUri {
    pub url: Url,
    query: HashMap<String, String>,
}

impl LinkUri {
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link)?;
        // a repeated parameter keeps its first value
        let mut query = HashMap::new();
        for (key, value) in url.query_pairs().into_owned() {
            query.entry(key).or_insert(value);
        }
        Ok(LinkUri { url, query })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Query parameter value, empty when absent.
    pub fn param(&self, key: &str) -> String {
        self.query.get(key).cloned().unwrap_or_default()
    }

    /// Host without IPv6 brackets.
    pub fn host(&self) -> Result<String> {
        let host = self
            .url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DecodeError::UriInvalid(error_msg::MISSING_HOST.to_string()))?;
        Ok(host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string())
    }

    pub fn port(&self) -> Result<String> {
        self.url
            .port()
            .map(|p| p.to_string())
            .ok_or_else(|| DecodeError::UriInvalid(error_msg::MISSING_PORT.to_string()))
    }

    /// Percent-decoded userinfo username.
    pub fn username(&self) -> String {
        percent_decode(self.url.username())
    }

    /// Percent-decoded userinfo password, if the link carries one.
    pub fn password(&self) -> Option<String> {
        self.url.password().map(percent_decode)
    }

    /// Percent-decoded fragment (remark), empty when absent.
    pub fn fragment(&self) -> String {
        self.url.fragment().map(percent_decode).unwrap_or_default()
    }

    /// Transport parameters as VLESS and Trojan links spell them.
    pub fn transport(&self) -> Transport {
        Transport {
            network: self.param("type"),
            header_type: self.param("headerType"),
            path: self.param("path"),
            host: self.param("host"),
            mode: self.param("mode"),
            service_name: self.param("serviceName"),
        }
    }

    /// TLS/Reality parameters as VLESS and Trojan links spell them.
    pub fn tls(&self) -> TlsSettings {
        TlsSettings {
            security: self.param("security"),
            server_name: self.param("sni"),
            alpn: self.param("alpn"),
            fingerprint: self.param("fp"),
            allow_insecure: self.param("allowInsecure"),
            public_key: self.param("pbk"),
            short_id: self.param("sid"),
        }
    }
}

pub(crate) fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| s.to_string())
}
