//! Canonical connection profile
//!
//! Every share link form decodes into one [`ConnectionProfile`]. The profile is
//! protocol-agnostic: fields that do not apply to a protocol stay empty, and the
//! builders skip empty fields when producing documents.

use serde::{Deserialize, Serialize};

/// Proxy protocol carried by a share link
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// VMess
    VMess,
    /// VLESS
    VLess,
    /// Shadowsocks
    Shadowsocks,
    /// Trojan
    Trojan,
}

impl Protocol {
    /// All supported protocols
    pub const ALL: [Protocol; 4] = [
        Protocol::VMess,
        Protocol::VLess,
        Protocol::Shadowsocks,
        Protocol::Trojan,
    ];

    /// Share link scheme without `://` (`vmess`, `vless`, `ss`, `trojan`)
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::VMess => "vmess",
            Protocol::VLess => "vless",
            Protocol::Shadowsocks => "ss",
            Protocol::Trojan => "trojan",
        }
    }

    /// Outbound type name used by both Xray and sing-box
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::VMess => "vmess",
            Protocol::VLess => "vless",
            Protocol::Shadowsocks => "shadowsocks",
            Protocol::Trojan => "trojan",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Credential carried by the link; the variant follows the protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// User UUID (VMess, VLESS)
    Uuid(String),
    /// Cipher method and password (Shadowsocks)
    MethodPassword {
        /// Cipher method, e.g. `aes-256-gcm`
        method: String,
        /// Password
        password: String,
    },
    /// Password only (Trojan)
    Password(String),
}

impl Identity {
    /// UUID, if this is a UUID identity
    pub fn uuid(&self) -> Option<&str> {
        match self {
            Identity::Uuid(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Password, for Shadowsocks and Trojan identities
    pub fn password(&self) -> Option<&str> {
        match self {
            Identity::MethodPassword { password, .. } | Identity::Password(password) => {
                Some(password.as_str())
            }
            Identity::Uuid(_) => None,
        }
    }

    /// Cipher method, for Shadowsocks identities
    pub fn method(&self) -> Option<&str> {
        match self {
            Identity::MethodPassword { method, .. } => Some(method.as_str()),
            _ => None,
        }
    }

    /// Whether this identity variant belongs to `protocol`
    pub fn matches(&self, protocol: Protocol) -> bool {
        matches!(
            (self, protocol),
            (Identity::Uuid(_), Protocol::VMess | Protocol::VLess)
                | (Identity::MethodPassword { .. }, Protocol::Shadowsocks)
                | (Identity::Password(_), Protocol::Trojan)
        )
    }
}

/// Stream transport parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transport {
    /// Stream type (tcp, ws, grpc, http, httpupgrade, ...)
    pub network: String,
    /// Camouflage header type (VMess `type`, VLESS `headerType`)
    pub header_type: String,
    /// Path (ws/http/httpupgrade)
    pub path: String,
    /// Host header override
    pub host: String,
    /// Transport mode (e.g. gRPC `gun`/`multi`)
    pub mode: String,
    /// gRPC service name
    pub service_name: String,
}

/// TLS and Reality parameters, kept as they appear in the link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsSettings {
    /// Security field (`tls`, `reality`, `none`, ...)
    pub security: String,
    /// Server name indication
    pub server_name: String,
    /// Comma-joined ALPN list
    pub alpn: String,
    /// Client fingerprint hint (chrome, firefox, ...)
    pub fingerprint: String,
    /// Raw `allowInsecure` value
    pub allow_insecure: String,
    /// Reality public key
    pub public_key: String,
    /// Reality short id
    pub short_id: String,
}

impl TlsSettings {
    /// True only when the raw `allowInsecure` value is exactly `"1"`.
    pub fn allows_insecure(&self) -> bool {
        self.allow_insecure == "1"
    }

    /// ALPN entries split on `,`, trimmed, empties dropped
    pub fn alpn_list(&self) -> Vec<String> {
        self.alpn
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Decoded share link, independent of the link's lexical form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Protocol; decides which other fields are meaningful
    pub protocol: Protocol,
    /// Server host (domain or IP, without IPv6 brackets)
    pub address: String,
    /// Server port as decoded; parsed when a document is built
    pub port: String,
    /// Credential
    pub identity: Identity,
    /// Transport parameters
    #[serde(default)]
    pub transport: Transport,
    /// TLS parameters
    #[serde(default)]
    pub tls: TlsSettings,
    /// Shadowsocks SIP002 plugin (`name;opts`)
    #[serde(default)]
    pub plugin: String,
    /// Display label
    #[serde(default)]
    pub remark: String,
}

impl ConnectionProfile {
    /// Creates a profile with empty transport/TLS parameters.
    pub fn new(
        protocol: Protocol,
        address: impl Into<String>,
        port: impl Into<String>,
        identity: Identity,
    ) -> Self {
        ConnectionProfile {
            protocol,
            address: address.into(),
            port: port.into(),
            identity,
            transport: Transport::default(),
            tls: TlsSettings::default(),
            plugin: String::new(),
            remark: String::new(),
        }
    }

    /// UUID credential (VMess/VLESS)
    pub fn uuid(&self) -> Option<&str> {
        self.identity.uuid()
    }

    /// Password credential (Shadowsocks/Trojan)
    pub fn password(&self) -> Option<&str> {
        self.identity.password()
    }

    /// Cipher method (Shadowsocks)
    pub fn method(&self) -> Option<&str> {
        self.identity.method()
    }

    /// Splits the SIP002 plugin string into the plugin name and its options.
    pub fn plugin_parts(&self) -> Option<(&str, &str)> {
        if self.plugin.is_empty() {
            return None;
        }
        Some(self.plugin.split_once(';').unwrap_or((self.plugin.as_str(), "")))
    }
}
