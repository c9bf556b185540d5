//! # VPN Link Config
//!
//! Turns a proxy share link into ready-to-run client configs for Xray and sing-box.
//! Supports VMess, VLESS, Shadowsocks and Trojan links.
//!
//! ## Pipeline
//!
//! 1. [`decode`] parses a share link into a [`ConnectionProfile`], the protocol-agnostic
//!    view of the server, its credential, transport and TLS parameters.
//! 2. [`synthesize`] builds one [`Target`]'s document from the profile and encodes it as
//!    two-space indented JSON. [`Xray`] and [`Singbox`] expose the typed documents through
//!    the [`Synthesizer`] trait.
//!
//! Every document holds exactly one local inbound and one outbound to the decoded server.
//! Both stages are pure: no I/O, no logging, no shared state.
//!
//! ## Supported links
//!
//! - **[VMess]** (`vmess://`): Base64 of a JSON object; missing or wrong-typed keys decode as empty
//! - **[VLESS]** (`vless://`): UUID userinfo, transport/TLS/Reality query parameters
//! - **[Shadowsocks]** (`ss://`): SIP002, Base64 `method:password` userinfo, optional plugin
//! - **[Trojan]** (`trojan://`): password userinfo, TLS query parameters
//!
//! ## Errors
//!
//! Decoding fails with [`DecodeError`]: `Base64Invalid`, `JsonInvalid`, `UriInvalid`,
//! `UnsupportedProtocol`, `ShadowsocksCredentialMalformed`. Building a document fails with
//! [`SynthesisError`], independently per target; a VMess link with an unusable port still
//! decodes and only fails once a document needs the port.
//!
//! ## Example
//!
//! ```rust
//! use vpn_link_config::{SynthesisOptions, Target};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = vpn_link_config::decode("trojan://secret@example.com:443?sni=example.com#home")?;
//! let options = SynthesisOptions::default();
//!
//! let xray = vpn_link_config::synthesize(&profile, Target::Xray, &options)?;
//! let singbox = vpn_link_config::synthesize(&profile, Target::Singbox, &options)?;
//! assert!(!xray.is_empty() && !singbox.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! [VMess]: https://www.v2ray.com/en/configuration/protocols/vmess.html
//! [VLESS]: https://xtls.github.io/en/config/outbounds/vless.html
//! [Shadowsocks]: https://shadowsocks.org/doc/sip002.html
//! [Trojan]: https://trojan-gfw.github.io/trojan/protocol.html

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod constants;
mod error;
mod options;
mod profile;
mod shadowsocks;
mod singbox;
mod synthesis;
mod trojan;
mod uri;
mod vless;
mod vmess;
mod xray;

#[cfg(test)]
mod protocols_comprehensive;

pub use error::{DecodeError, Result, SynthesisError};
pub use options::{SingboxInboundOptions, SynthesisOptions, XrayInboundOptions};
pub use profile::{ConnectionProfile, Identity, Protocol, TlsSettings, Transport};
pub use singbox::{
    LogConfig, MixedInbound, OutboundTls, RealityConfig, ShadowsocksOutbound, Singbox,
    SingboxDocument, SingboxOutbound, TrojanOutbound, UtlsConfig, V2RayTransport, VLessOutbound,
    VMessOutbound,
};
pub use synthesis::{Synthesizer, Target};
pub use xray::{
    HttpHeader, HttpRequest, OutboundSettings, ShadowsocksServer, ShadowsocksSettings,
    SocksSettings, StreamSettings, TcpSettings, TrojanServer, TrojanSettings, VNextServer,
    VNextSettings, VNextUser, Xray, XrayDocument, XrayInbound, XrayOutbound, XrayTlsSettings,
};

use crate::constants::scheme;
use crate::uri::LinkUri;

/// Decode a share link into a [`ConnectionProfile`]
///
/// Surrounding whitespace is ignored. A `vmess://` prefix (any case) selects the
/// Base64-JSON form; anything else is parsed as a URI and dispatched on its scheme.
///
/// # Errors
///
/// Returns `DecodeError` if the link is malformed or its scheme is not supported.
///
/// # Example
///
/// ```rust
/// use vpn_link_config::{Identity, Protocol};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let profile = vpn_link_config::decode("trojan://pw@host:443#remark")?;
/// assert_eq!(profile.protocol, Protocol::Trojan);
/// assert_eq!(profile.identity, Identity::Password("pw".to_string()));
/// assert_eq!(profile.remark, "remark");
/// # Ok(())
/// # }
/// ```
pub fn decode(link: &str) -> Result<ConnectionProfile> {
    let link = link.trim();

    if has_scheme(link, scheme::VMESS) {
        return vmess::decode(link);
    }

    let uri = LinkUri::parse(link)?;
    match uri.scheme() {
        "vless" => vless::decode(&uri),
        "ss" => shadowsocks::decode(link, &uri),
        "trojan" => trojan::decode(&uri),
        other => Err(DecodeError::UnsupportedProtocol(other.to_string())),
    }
}

/// Build the document for `target` and encode it as two-space indented JSON
///
/// # Errors
///
/// Returns `SynthesisError` if the profile cannot be expressed for the target,
/// e.g. when its port is not an integer in 1–65535.
pub fn synthesize(
    profile: &ConnectionProfile,
    target: Target,
    options: &SynthesisOptions,
) -> std::result::Result<Vec<u8>, SynthesisError> {
    match target {
        Target::Xray => Xray::render(profile, options),
        Target::Singbox => Singbox::render(profile, options),
    }
}

/// One target's outcome from [`convert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Target the document was built for
    pub target: Target,
    /// JSON bytes, or why this target failed
    pub document: std::result::Result<Vec<u8>, SynthesisError>,
}

/// Decode `link` once and synthesize every requested target
///
/// A failure for one target does not affect the others.
///
/// # Errors
///
/// Returns `DecodeError` if the link cannot be decoded; synthesis errors are
/// reported per target inside [`Rendered`].
pub fn convert(
    link: &str,
    targets: &[Target],
    options: &SynthesisOptions,
) -> Result<Vec<Rendered>> {
    let profile = decode(link)?;
    Ok(targets
        .iter()
        .map(|&target| Rendered {
            target,
            document: synthesize(&profile, target, options),
        })
        .collect())
}

fn has_scheme(link: &str, scheme: &str) -> bool {
    link.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}
