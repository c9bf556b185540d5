//! Values the caller supplies to synthesis instead of compiling them in
//!
//! Every field has a default, so a JSON options file only needs the keys it changes:
//!
//! ```json
//! { "singbox": { "port": 7890 }, "remote_port": 8443 }
//! ```

use serde::{Deserialize, Serialize};

const DEFAULT_XRAY_LISTEN: &str = "127.0.0.1";
const DEFAULT_XRAY_PORT: u16 = 1080;
const DEFAULT_SINGBOX_LISTEN: &str = "::";
const DEFAULT_SINGBOX_PORT: u16 = 2080;
const DEFAULT_SINGBOX_LOG_LEVEL: &str = "error";

/// Options shared by every synthesis call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SynthesisOptions {
    /// Local SOCKS inbound of Xray documents
    pub xray: XrayInboundOptions,
    /// Local mixed inbound and log level of sing-box documents
    pub singbox: SingboxInboundOptions,
    /// Remote port used for every outbound instead of the decoded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
}

impl SynthesisOptions {
    /// Reads options from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Xray SOCKS inbound settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct XrayInboundOptions {
    /// Listen address
    pub listen: String,
    /// Listen port
    pub port: u16,
    /// Relay UDP through the SOCKS inbound
    pub udp: bool,
}

impl Default for XrayInboundOptions {
    fn default() -> Self {
        XrayInboundOptions {
            listen: DEFAULT_XRAY_LISTEN.to_string(),
            port: DEFAULT_XRAY_PORT,
            udp: true,
        }
    }
}

/// sing-box mixed inbound settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SingboxInboundOptions {
    /// Listen address
    pub listen: String,
    /// Listen port
    pub port: u16,
    /// Sniff the destination protocol on the inbound
    pub sniff: bool,
    /// `log.level` of the document
    pub log_level: String,
}

impl Default for SingboxInboundOptions {
    fn default() -> Self {
        SingboxInboundOptions {
            listen: DEFAULT_SINGBOX_LISTEN.to_string(),
            port: DEFAULT_SINGBOX_PORT,
            sniff: true,
            log_level: DEFAULT_SINGBOX_LOG_LEVEL.to_string(),
        }
    }
}
