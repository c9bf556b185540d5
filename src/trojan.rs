//! Trojan link decoder
//!
//! Link format: `trojan://<password>@<host>:<port>[?query][#remark]`
//!
//! The userinfo username is the password, percent-decoded and otherwise used as is.
//! Query parameters are read with the same names as VLESS (`security`, `sni`, `fp`,
//! `alpn`, `allowInsecure`, `type`, `path`, `host`, ...).

use crate::error::Result;
use crate::profile::{ConnectionProfile, Identity, Protocol};
use crate::uri::LinkUri;

pub(crate) fn decode(uri: &LinkUri) -> Result<ConnectionProfile> {
    let mut profile = ConnectionProfile::new(
        Protocol::Trojan,
        uri.host()?,
        uri.port()?,
        Identity::Password(uri.username()),
    );
    profile.transport = uri.transport();
    profile.tls = uri.tls();
    profile.remark = uri.fragment();

    Ok(profile)
}
