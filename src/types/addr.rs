//! Synthetic hardware addresses for simulated ports.

use crate::types::{Dpid, PortNo};
use core::fmt;
use serde::{Deserialize, Serialize};

/// A 6-byte hardware address.
///
/// Addresses are synthetic: the topology builder derives them from the
/// owning switch and port, and the event generator fabricates source
/// addresses with the locally-administered bit set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HwAddr([u8; 6]);

impl HwAddr {
    /// Creates an address from raw octets.
    #[inline]
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Derives the stable address for a port: `00:00:00:00:<dpid>:<port>`.
    ///
    /// Only the low byte of each component is used; simulated fabrics are
    /// far smaller than the address space.
    #[must_use]
    pub fn for_port(dpid: Dpid, port: PortNo) -> Self {
        Self([0, 0, 0, 0, (dpid.as_u64() & 0xff) as u8, (port.as_u16() & 0xff) as u8])
    }

    /// Returns the raw octets.
    #[inline]
    #[must_use]
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    /// Returns true if the locally-administered bit is set.
    #[inline]
    #[must_use]
    pub const fn is_local(self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Debug for HwAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HwAddr({self})")
    }
}

impl fmt::Display for HwAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
