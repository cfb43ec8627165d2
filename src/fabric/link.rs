//! Directed links between switch ports.

use crate::types::{Dpid, PortNo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One end of a link: a specific port on a specific switch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Endpoint {
    /// The switch.
    pub dpid: Dpid,
    /// The port on that switch.
    pub port: PortNo,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dpid, self.port)
    }
}

/// A directed edge between two endpoints.
///
/// The fabric maintains links symmetrically: every physical connection is
/// represented by a forward and a reverse `Link`, so forwarding in either
/// direction is a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source endpoint.
    pub src: Endpoint,
    /// Destination endpoint.
    pub dst: Endpoint,
}

impl Link {
    /// The same physical connection traversed in the other direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}
