//! Target selection and the builder trait shared by the Xray and sing-box synthesizers.

use crate::error::SynthesisError;
use crate::options::SynthesisOptions;
use crate::profile::{ConnectionProfile, Identity, Protocol};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Client runtime a document is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Xray-core JSON config
    Xray,
    /// sing-box JSON config
    Singbox,
}

impl Target {
    /// Both targets, in output order
    pub const ALL: [Target; 2] = [Target::Xray, Target::Singbox];

    /// Lowercase target name
    pub fn name(&self) -> &'static str {
        match self {
            Target::Xray => "xray",
            Target::Singbox => "singbox",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xray" => Ok(Target::Xray),
            "singbox" | "sing-box" => Ok(Target::Singbox),
            other => Err(format!("unknown target: {}", other)),
        }
    }
}

/// Builds one target's document from a profile
///
/// Implementations are pure: the same profile and options always give the same document.
pub trait Synthesizer {
    /// Document type produced
    type Document: Serialize;

    /// Build the typed document
    ///
    /// # Errors
    ///
    /// Returns `SynthesisError` if the protocol has no builder, the identity does not
    /// match the protocol, or the port is not usable.
    fn build(
        profile: &ConnectionProfile,
        options: &SynthesisOptions,
    ) -> Result<Self::Document, SynthesisError>;

    /// Build the document and encode it as two-space indented JSON
    ///
    /// # Errors
    ///
    /// Returns `SynthesisError` if building or encoding fails.
    fn render(
        profile: &ConnectionProfile,
        options: &SynthesisOptions,
    ) -> Result<Vec<u8>, SynthesisError> {
        let document = Self::build(profile, options)?;
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

/// Port every outbound dials: the override when configured, else the decoded port.
pub(crate) fn remote_port(
    profile: &ConnectionProfile,
    options: &SynthesisOptions,
) -> Result<u16, SynthesisError> {
    let invalid =
        |value: &str| SynthesisError::InvalidPort(format!("{:?} is not in 1-65535", value));
    match options.remote_port {
        Some(0) => Err(invalid("0")),
        Some(port) => Ok(port),
        None => profile
            .port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| invalid(&profile.port)),
    }
}

pub(crate) fn ensure_identity(profile: &ConnectionProfile) -> Result<(), SynthesisError> {
    if profile.identity.matches(profile.protocol) {
        Ok(())
    } else {
        let kind = match profile.identity {
            Identity::Uuid(_) => "a UUID",
            Identity::MethodPassword { .. } => "a method/password",
            Identity::Password(_) => "a password",
        };
        Err(SynthesisError::IdentityMismatch(format!(
            "{} profile carries {} credential",
            profile.protocol, kind
        )))
    }
}

/// Looks up the builder registered for a protocol.
pub(crate) fn lookup<B: Copy>(
    table: &[(Protocol, B)],
    profile: &ConnectionProfile,
) -> Result<B, SynthesisError> {
    table
        .iter()
        .find(|(protocol, _)| *protocol == profile.protocol)
        .map(|(_, builder)| *builder)
        .ok_or_else(|| SynthesisError::UnsupportedProtocol(profile.protocol.to_string()))
}
