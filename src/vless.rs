//! VLESS link decoder
//!
//! URI format (RFC 3986): `vless://<uuid>@<address>:<port>[?<query>][#<remark>]`
//!
//! **Query parameters**: `type`, `headerType`, `path`, `host`, `mode`, `serviceName`,
//! `security`, `sni`, `fp`, `alpn`, `allowInsecure`, `pbk` (Reality public key),
//! `sid` (Reality short id). Absent parameters stay empty.

use crate::error::Result;
use crate::profile::{ConnectionProfile, Identity, Protocol};
use crate::uri::LinkUri;

pub(crate) fn decode(uri: &LinkUri) -> Result<ConnectionProfile> {
    let mut profile = ConnectionProfile::new(
        Protocol::VLess,
        uri.host()?,
        uri.port()?,
        Identity::Uuid(uri.username()),
    );
    profile.transport = uri.transport();
    profile.tls = uri.tls();
    profile.remark = uri.fragment();

    Ok(profile)
}
