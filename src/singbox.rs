//! sing-box client config synthesis
//!
//! Produces `log`, one local `mixed` inbound and one outbound tagged `<protocol>-out`.
//! VMess, VLESS and Trojan outbounds carry a TLS block with uTLS fingerprint
//! emulation always enabled; VLESS adds `flow` and a disabled Reality block.
//! Shadowsocks carries no TLS.

use crate::constants::singbox as consts;
use crate::error::SynthesisError;
use crate::options::{SingboxInboundOptions, SynthesisOptions};
use crate::profile::{ConnectionProfile, Protocol, Transport};
use crate::synthesis::{self, Synthesizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete sing-box client config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SingboxDocument {
    /// Log settings
    pub log: LogConfig,
    /// Local listeners; always exactly one
    pub inbounds: Vec<MixedInbound>,
    /// Remote proxies; always exactly one
    pub outbounds: Vec<SingboxOutbound>,
}

/// `log` block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level
    pub level: String,
}

/// Local mixed (SOCKS + HTTP) inbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MixedInbound {
    /// Always `mixed`
    #[serde(rename = "type")]
    pub kind: String,
    /// Inbound tag
    pub tag: String,
    /// Listen address
    pub listen: String,
    /// Listen port
    pub listen_port: u16,
    /// Sniff destination protocol
    pub sniff: bool,
    /// Replace destination with the sniffed domain
    pub sniff_override_destination: bool,
}

/// Outbound towards the decoded server, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SingboxOutbound {
    /// VMess outbound
    #[serde(rename = "vmess")]
    VMess(VMessOutbound),
    /// VLESS outbound
    #[serde(rename = "vless")]
    VLess(VLessOutbound),
    /// Shadowsocks outbound
    #[serde(rename = "shadowsocks")]
    Shadowsocks(ShadowsocksOutbound),
    /// Trojan outbound
    #[serde(rename = "trojan")]
    Trojan(TrojanOutbound),
}

impl SingboxOutbound {
    /// Outbound tag
    pub fn tag(&self) -> &str {
        match self {
            SingboxOutbound::VMess(o) => &o.tag,
            SingboxOutbound::VLess(o) => &o.tag,
            SingboxOutbound::Shadowsocks(o) => &o.tag,
            SingboxOutbound::Trojan(o) => &o.tag,
        }
    }
}

/// VMess outbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VMessOutbound {
    /// Outbound tag
    pub tag: String,
    /// Server address
    pub server: String,
    /// Server port
    pub server_port: u16,
    /// User UUID
    pub uuid: String,
    /// Cipher
    pub security: String,
    /// Legacy alter id
    pub alter_id: u32,
    /// `tcp` or `udp`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    /// TLS block
    pub tls: OutboundTls,
    /// V2Ray transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// VLESS outbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VLessOutbound {
    /// Outbound tag
    pub tag: String,
    /// Server address
    pub server: String,
    /// Server port
    pub server_port: u16,
    /// User UUID
    pub uuid: String,
    /// Flow, from the link's security field
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,
    /// `tcp` or `udp`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    /// TLS block, with Reality
    pub tls: OutboundTls,
    /// V2Ray transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// Shadowsocks outbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShadowsocksOutbound {
    /// Outbound tag
    pub tag: String,
    /// Server address
    pub server: String,
    /// Server port
    pub server_port: u16,
    /// Cipher method
    pub method: String,
    /// Password
    pub password: String,
    /// SIP003 plugin name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plugin: String,
    /// SIP003 plugin options
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub plugin_opts: String,
}

/// Trojan outbound
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrojanOutbound {
    /// Outbound tag
    pub tag: String,
    /// Server address
    pub server: String,
    /// Server port
    pub server_port: u16,
    /// Password
    pub password: String,
    /// `tcp` or `udp`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    /// TLS block
    pub tls: OutboundTls,
    /// V2Ray transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<V2RayTransport>,
}

/// Outbound TLS block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundTls {
    /// Always true
    pub enabled: bool,
    /// SNI
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// Skip certificate verification
    pub insecure: bool,
    /// ALPN list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    /// Client fingerprint emulation
    pub utls: UtlsConfig,
    /// Reality (VLESS only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<RealityConfig>,
}

/// uTLS block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UtlsConfig {
    /// Always true
    pub enabled: bool,
    /// Fingerprint name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
}

/// Reality block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealityConfig {
    /// Always false
    pub enabled: bool,
    /// Server public key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    /// Short id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_id: String,
}

/// V2Ray transport, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum V2RayTransport {
    /// WebSocket
    Ws {
        /// Request path
        #[serde(default, skip_serializing_if = "String::is_empty")]
        path: String,
        /// Extra headers
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    /// gRPC
    Grpc {
        /// Service name
        #[serde(default, skip_serializing_if = "String::is_empty")]
        service_name: String,
    },
    /// HTTP/2
    Http {
        /// Host list
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        host: Vec<String>,
        /// Request path
        #[serde(default, skip_serializing_if = "String::is_empty")]
        path: String,
    },
    /// HTTP upgrade
    HttpUpgrade {
        /// Host header
        #[serde(default, skip_serializing_if = "String::is_empty")]
        host: String,
        /// Request path
        #[serde(default, skip_serializing_if = "String::is_empty")]
        path: String,
    },
}

/// sing-box document builder
#[derive(Debug, Clone, Copy, Default)]
pub struct Singbox;

type OutboundBuilder = fn(&ConnectionProfile, u16) -> SingboxOutbound;

const OUTBOUND_BUILDERS: &[(Protocol, OutboundBuilder)] = &[
    (Protocol::VMess, vmess_outbound),
    (Protocol::VLess, vless_outbound),
    (Protocol::Shadowsocks, shadowsocks_outbound),
    (Protocol::Trojan, trojan_outbound),
];

impl Synthesizer for Singbox {
    type Document = SingboxDocument;

    fn build(
        profile: &ConnectionProfile,
        options: &SynthesisOptions,
    ) -> Result<SingboxDocument, SynthesisError> {
        let builder = synthesis::lookup(OUTBOUND_BUILDERS, profile)?;
        synthesis::ensure_identity(profile)?;
        let port = synthesis::remote_port(profile, options)?;

        Ok(SingboxDocument {
            log: LogConfig {
                level: options.singbox.log_level.clone(),
            },
            inbounds: vec![mixed_inbound(&options.singbox)],
            outbounds: vec![builder(profile, port)],
        })
    }
}

fn mixed_inbound(options: &SingboxInboundOptions) -> MixedInbound {
    MixedInbound {
        kind: "mixed".to_string(),
        tag: consts::INBOUND_TAG.to_string(),
        listen: options.listen.clone(),
        listen_port: options.port,
        sniff: options.sniff,
        sniff_override_destination: false,
    }
}

fn outbound_tag(protocol: Protocol) -> String {
    format!("{}{}", protocol.name(), consts::OUTBOUND_TAG_SUFFIX)
}

/// sing-box only accepts `tcp` or `udp` here; stream types go to the transport block.
fn network(transport: &Transport) -> String {
    match transport.network.as_str() {
        "tcp" | "udp" => transport.network.clone(),
        _ => String::new(),
    }
}

fn tls(profile: &ConnectionProfile) -> OutboundTls {
    OutboundTls {
        enabled: true,
        server_name: profile.tls.server_name.clone(),
        insecure: profile.tls.allows_insecure(),
        alpn: profile.tls.alpn_list(),
        utls: UtlsConfig {
            enabled: true,
            fingerprint: profile.tls.fingerprint.clone(),
        },
        reality: None,
    }
}

fn v2ray_transport(transport: &Transport) -> Option<V2RayTransport> {
    match transport.network.as_str() {
        "ws" => {
            let mut headers = BTreeMap::new();
            if !transport.host.is_empty() {
                headers.insert("Host".to_string(), transport.host.clone());
            }
            Some(V2RayTransport::Ws {
                path: transport.path.clone(),
                headers,
            })
        }
        "grpc" => {
            let service_name = if transport.service_name.is_empty() {
                transport.path.clone()
            } else {
                transport.service_name.clone()
            };
            Some(V2RayTransport::Grpc { service_name })
        }
        "http" | "h2" => Some(V2RayTransport::Http {
            host: transport
                .host
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect(),
            path: transport.path.clone(),
        }),
        "httpupgrade" => Some(V2RayTransport::HttpUpgrade {
            host: transport.host.clone(),
            path: transport.path.clone(),
        }),
        _ => None,
    }
}

fn vmess_outbound(profile: &ConnectionProfile, port: u16) -> SingboxOutbound {
    SingboxOutbound::VMess(VMessOutbound {
        tag: outbound_tag(Protocol::VMess),
        server: profile.address.clone(),
        server_port: port,
        uuid: profile.uuid().unwrap_or_default().to_string(),
        security: consts::VMESS_SECURITY.to_string(),
        alter_id: 0,
        network: network(&profile.transport),
        tls: tls(profile),
        transport: v2ray_transport(&profile.transport),
    })
}

fn vless_outbound(profile: &ConnectionProfile, port: u16) -> SingboxOutbound {
    let mut tls = tls(profile);
    tls.reality = Some(RealityConfig {
        enabled: false,
        public_key: profile.tls.public_key.clone(),
        short_id: profile.tls.short_id.clone(),
    });

    SingboxOutbound::VLess(VLessOutbound {
        tag: outbound_tag(Protocol::VLess),
        server: profile.address.clone(),
        server_port: port,
        uuid: profile.uuid().unwrap_or_default().to_string(),
        flow: profile.tls.security.clone(),
        network: network(&profile.transport),
        tls,
        transport: v2ray_transport(&profile.transport),
    })
}

fn shadowsocks_outbound(profile: &ConnectionProfile, port: u16) -> SingboxOutbound {
    let (plugin, plugin_opts) = profile.plugin_parts().unwrap_or_default();

    SingboxOutbound::Shadowsocks(ShadowsocksOutbound {
        tag: outbound_tag(Protocol::Shadowsocks),
        server: profile.address.clone(),
        server_port: port,
        method: profile.method().unwrap_or_default().to_string(),
        password: profile.password().unwrap_or_default().to_string(),
        plugin: plugin.to_string(),
        plugin_opts: plugin_opts.to_string(),
    })
}

fn trojan_outbound(profile: &ConnectionProfile, port: u16) -> SingboxOutbound {
    SingboxOutbound::Trojan(TrojanOutbound {
        tag: outbound_tag(Protocol::Trojan),
        server: profile.address.clone(),
        server_port: port,
        password: profile.password().unwrap_or_default().to_string(),
        network: network(&profile.transport),
        tls: tls(profile),
        transport: v2ray_transport(&profile.transport),
    })
}
