//! The announce aspects this node listens for.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::AnnounceError;

/// A capability class of announced destination, used as the transport's
/// announce filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Aspect {
    /// `lxmf.delivery`: a peer that accepts LXMF messages directly.
    Delivery,
    /// `lxmf.propagation`: an LXMF propagation node.
    Propagation,
    /// `call.audio`: a realtime audio endpoint.
    Audio,
    /// `nomadnetwork.node`: a Nomad Network page node.
    NomadNode,
}

impl Aspect {
    /// Every aspect, in registration order.
    pub const ALL: [Aspect; 4] = [
        Aspect::Delivery,
        Aspect::Propagation,
        Aspect::Audio,
        Aspect::NomadNode,
    ];

    /// The filter string the transport matches announces against.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Aspect::Delivery => "lxmf.delivery",
            Aspect::Propagation => "lxmf.propagation",
            Aspect::Audio => "call.audio",
            Aspect::NomadNode => "nomadnetwork.node",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = AnnounceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aspect::ALL
            .into_iter()
            .find(|aspect| aspect.as_str() == s)
            .ok_or_else(|| AnnounceError::UnknownAspect(s.to_string()))
    }
}

impl TryFrom<String> for Aspect {
    type Error = AnnounceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Aspect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
