//! Xray client config synthesis
//!
//! Produces a document with one local SOCKS inbound and one outbound for the
//! decoded server:
//!
//! | Protocol | `settings` | `streamSettings` |
//! |----------|------------|------------------|
//! | VMess, VLESS | `vnext[{address, port, users[{id, encryption: "none", level: 0}]}]` | tcp + tls, ALPN `h3,h2,http/1.1`, HTTP camouflage header |
//! | Shadowsocks | `servers[{address, port, method, password}]` | none |
//! | Trojan | `servers[{address, port, password}]` | tcp + tls |
//!
//! `allowInsecure` is true only when the link's value is exactly `"1"`.

use crate::constants::xray as consts;
use crate::error::SynthesisError;
use crate::options::{SynthesisOptions, XrayInboundOptions};
use crate::profile::{ConnectionProfile, Protocol};
use crate::synthesis::{self, Synthesizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete Xray client config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XrayDocument {
    /// Local listeners; always exactly one
    pub inbounds: Vec<XrayInbound>,
    /// Remote proxies; always exactly one
    pub outbounds: Vec<XrayOutbound>,
}

/// Local SOCKS inbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XrayInbound {
    /// Listen port
    pub port: u16,
    /// Listen address
    pub listen: String,
    /// Always `socks`
    pub protocol: String,
    /// SOCKS settings
    pub settings: SocksSettings,
    /// Inbound tag
    pub tag: String,
}

/// SOCKS inbound settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocksSettings {
    /// Authentication mode
    pub auth: String,
    /// UDP relay
    pub udp: bool,
}

/// Outbound towards the decoded server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct XrayOutbound {
    /// Outbound protocol name
    pub protocol: String,
    /// Protocol-specific settings
    pub settings: OutboundSettings,
    /// Stream settings; absent for Shadowsocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
    /// `<protocol>-outbound`
    pub tag: String,
}

/// Settings shape, one per protocol family
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutboundSettings {
    /// VMess and VLESS
    VNext(VNextSettings),
    /// Shadowsocks
    Shadowsocks(ShadowsocksSettings),
    /// Trojan
    Trojan(TrojanSettings),
}

/// `vnext` server list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VNextSettings {
    /// Servers; always exactly one
    pub vnext: Vec<VNextServer>,
}

/// One VMess/VLESS server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VNextServer {
    /// Server address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Users; always exactly one
    pub users: Vec<VNextUser>,
}

/// One VMess/VLESS user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VNextUser {
    /// UUID
    pub id: String,
    /// Always `none`
    pub encryption: String,
    /// Always 0
    pub level: u32,
}

/// Shadowsocks server list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadowsocksSettings {
    /// Servers; always exactly one
    pub servers: Vec<ShadowsocksServer>,
}

/// One Shadowsocks server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadowsocksServer {
    /// Server address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Cipher method
    pub method: String,
    /// Password
    pub password: String,
}

/// Trojan server list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrojanSettings {
    /// Servers; always exactly one
    pub servers: Vec<TrojanServer>,
}

/// One Trojan server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrojanServer {
    /// Server address
    pub address: String,
    /// Server port
    pub port: u16,
    /// Password
    pub password: String,
}

/// Stream settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    /// Always `tcp`
    pub network: String,
    /// Always `tls`
    pub security: String,
    /// TLS parameters
    pub tls_settings: XrayTlsSettings,
    /// HTTP camouflage header (VMess/VLESS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_settings: Option<TcpSettings>,
}

/// TLS parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct XrayTlsSettings {
    /// SNI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// uTLS fingerprint
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
    /// ALPN list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    /// Skip certificate verification
    pub allow_insecure: bool,
}

/// TCP transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TcpSettings {
    /// Camouflage header
    pub header: HttpHeader,
}

/// HTTP camouflage header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpHeader {
    /// Always `http`
    #[serde(rename = "type")]
    pub kind: String,
    /// Request shape
    pub request: HttpRequest,
}

/// Camouflage request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request paths
    pub path: Vec<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,
}

/// Xray document builder
#[derive(Debug, Clone, Copy, Default)]
pub struct Xray;

type OutboundBuilder = fn(&ConnectionProfile, u16) -> XrayOutbound;

const OUTBOUND_BUILDERS: &[(Protocol, OutboundBuilder)] = &[
    (Protocol::VMess, vnext_outbound),
    (Protocol::VLess, vnext_outbound),
    (Protocol::Shadowsocks, shadowsocks_outbound),
    (Protocol::Trojan, trojan_outbound),
];

impl Synthesizer for Xray {
    type Document = XrayDocument;

    fn build(
        profile: &ConnectionProfile,
        options: &SynthesisOptions,
    ) -> Result<XrayDocument, SynthesisError> {
        let builder = synthesis::lookup(OUTBOUND_BUILDERS, profile)?;
        synthesis::ensure_identity(profile)?;
        let port = synthesis::remote_port(profile, options)?;

        Ok(XrayDocument {
            inbounds: vec![socks_inbound(&options.xray)],
            outbounds: vec![builder(profile, port)],
        })
    }
}

fn socks_inbound(options: &XrayInboundOptions) -> XrayInbound {
    XrayInbound {
        port: options.port,
        listen: options.listen.clone(),
        protocol: "socks".to_string(),
        settings: SocksSettings {
            auth: "noauth".to_string(),
            udp: options.udp,
        },
        tag: consts::INBOUND_TAG.to_string(),
    }
}

fn outbound_tag(protocol: Protocol) -> String {
    format!("{}{}", protocol.name(), consts::OUTBOUND_TAG_SUFFIX)
}

fn vnext_outbound(profile: &ConnectionProfile, port: u16) -> XrayOutbound {
    let transport = &profile.transport;
    let path = if transport.path.is_empty() {
        consts::DEFAULT_HEADER_PATH.to_string()
    } else {
        transport.path.clone()
    };
    let mut headers = BTreeMap::new();
    if !transport.host.is_empty() {
        headers.insert("Host".to_string(), vec![transport.host.clone()]);
    }

    XrayOutbound {
        protocol: profile.protocol.name().to_string(),
        settings: OutboundSettings::VNext(VNextSettings {
            vnext: vec![VNextServer {
                address: profile.address.clone(),
                port,
                users: vec![VNextUser {
                    id: profile.uuid().unwrap_or_default().to_string(),
                    encryption: consts::USER_ENCRYPTION.to_string(),
                    level: 0,
                }],
            }],
        }),
        stream_settings: Some(StreamSettings {
            network: "tcp".to_string(),
            security: "tls".to_string(),
            tls_settings: XrayTlsSettings {
                server_name: profile.tls.server_name.clone(),
                fingerprint: profile.tls.fingerprint.clone(),
                alpn: consts::ALPN.iter().map(|s| s.to_string()).collect(),
                allow_insecure: profile.tls.allows_insecure(),
            },
            tcp_settings: Some(TcpSettings {
                header: HttpHeader {
                    kind: "http".to_string(),
                    request: HttpRequest {
                        path: vec![path],
                        headers,
                    },
                },
            }),
        }),
        tag: outbound_tag(profile.protocol),
    }
}

fn shadowsocks_outbound(profile: &ConnectionProfile, port: u16) -> XrayOutbound {
    XrayOutbound {
        protocol: Protocol::Shadowsocks.name().to_string(),
        settings: OutboundSettings::Shadowsocks(ShadowsocksSettings {
            servers: vec![ShadowsocksServer {
                address: profile.address.clone(),
                port,
                method: profile.method().unwrap_or_default().to_string(),
                password: profile.password().unwrap_or_default().to_string(),
            }],
        }),
        stream_settings: None,
        tag: outbound_tag(Protocol::Shadowsocks),
    }
}

fn trojan_outbound(profile: &ConnectionProfile, port: u16) -> XrayOutbound {
    XrayOutbound {
        protocol: Protocol::Trojan.name().to_string(),
        settings: OutboundSettings::Trojan(TrojanSettings {
            servers: vec![TrojanServer {
                address: profile.address.clone(),
                port,
                password: profile.password().unwrap_or_default().to_string(),
            }],
        }),
        // Trojan is TLS by definition; no camouflage header on top.
        stream_settings: Some(StreamSettings {
            network: "tcp".to_string(),
            security: "tls".to_string(),
            tls_settings: XrayTlsSettings {
                server_name: profile.tls.server_name.clone(),
                fingerprint: profile.tls.fingerprint.clone(),
                alpn: profile.tls.alpn_list(),
                allow_insecure: profile.tls.allows_insecure(),
            },
            tcp_settings: None,
        }),
        tag: outbound_tag(Protocol::Trojan),
    }
}
