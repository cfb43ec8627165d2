//! Identifier types for fabric entities.
//!
//! These newtypes keep dpids, port numbers, message ids, and logical round
//! counters from being mixed up at call sites. Ordering on every identifier
//! is significant: the round scheduler iterates entities in ascending
//! identifier order so that PRNG draws are taken in a stable sequence.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Datapath identifier: the unique non-negative integer naming a switch.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Dpid(u64);

impl Dpid {
    /// Creates a dpid from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw dpid value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Dpid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dpid({})", self.0)
    }
}

impl fmt::Display for Dpid {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Port number, 1-based and unique within a switch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortNo(u16);

impl PortNo {
    /// Creates a port number from its raw 1-based value.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is zero; port numbering starts at 1.
    #[must_use]
    pub fn new(raw: u16) -> Self {
        assert!(raw > 0, "port numbers are 1-based");
        Self(raw)
    }

    /// Returns the raw port number.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns the 0-based port index used by wiring policies.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Creates a port number from a 0-based wiring index.
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::new(u16::try_from(index + 1).expect("port index out of range"))
    }
}

impl fmt::Debug for PortNo {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortNo({})", self.0)
    }
}

impl fmt::Display for PortNo {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Identity of a message tracked by the transit registry.
///
/// Assigned in registration order; the registry iterates messages in
/// ascending id order when evaluating delay/drop decisions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Creates a message id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next id in registration order.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for MessageId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Logical time: the number of completed fuzz rounds.
///
/// Strictly increasing, starting at zero. Not persisted beyond a run.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Round(u64);

impl Round {
    /// Round zero: no rounds have completed yet.
    pub const ZERO: Self = Self(0);

    /// Creates a round counter from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw round count.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the counter advanced by one completed round.
    #[inline]
    #[must_use]
    pub const fn advanced(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for Round {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round({})", self.0)
    }
}

impl fmt::Display for Round {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {}", self.0)
    }
}
