//! Shared constants for link schemes, output tags and fixed config values.

/// Scheme prefixes matched on the raw link (lowercase, with `://`).
pub mod scheme {
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// Shadowsocks: `ss://`
    pub const SHADOWSOCKS: &str = "ss://";
}

/// Common error message fragments for link decoding.
pub mod error_msg {
    /// Shadowsocks userinfo did not split into `method:password`.
    pub const INVALID_SS_FORMAT: &str = "invalid Shadowsocks URI format";
    /// URI has no host component.
    pub const MISSING_HOST: &str = "missing host";
    /// URI has no port component.
    pub const MISSING_PORT: &str = "missing port";
    /// VMess body decoded to JSON that is not an object.
    pub const EXPECTED_OBJECT: &str = "expected a JSON object";
}

/// Values baked into every generated Xray document.
pub mod xray {
    /// Tag of the local SOCKS inbound.
    pub const INBOUND_TAG: &str = "socks-inbound";
    /// Suffix appended to the protocol name to form the outbound tag.
    pub const OUTBOUND_TAG_SUFFIX: &str = "-outbound";
    /// ALPN preference list for VMess/VLESS stream settings.
    pub const ALPN: [&str; 3] = ["h3", "h2", "http/1.1"];
    /// User encryption for vnext users.
    pub const USER_ENCRYPTION: &str = "none";
    /// Path used in the HTTP camouflage header when the link has none.
    pub const DEFAULT_HEADER_PATH: &str = "/";
}

/// Values baked into every generated sing-box document.
pub mod singbox {
    /// Tag of the local mixed inbound.
    pub const INBOUND_TAG: &str = "mixed-in";
    /// Suffix appended to the protocol name to form the outbound tag.
    pub const OUTBOUND_TAG_SUFFIX: &str = "-out";
    /// VMess cipher negotiated by the client.
    pub const VMESS_SECURITY: &str = "auto";
}
