//! Patch panel wiring policies.
//!
//! A patch panel is a stateless function from a local port to the remote
//! port it is physically wired to. Policies must be bijective and symmetric:
//! following a wire twice lands back on the starting port, and no two ports
//! share a far end.

use crate::fabric::link::Endpoint;
use crate::types::{Dpid, PortNo};
use std::fmt;

/// A wiring policy mapping a port to its physically connected peer.
pub trait PatchPanel: fmt::Debug {
    /// The remote endpoint wired to `(dpid, port)`, or `None` if the port
    /// is unknown to this policy.
    fn connected_port(&self, dpid: Dpid, port: PortNo) -> Option<Endpoint>;
}

/// Full-mesh wiring: every pair of switches shares exactly one wire.
///
/// With N switches and N-1 ports per switch, port index `i` (0-based) on
/// the switch at position `s` connects to the switch at position `i` when
/// `i < s`, else to position `i + 1`; the remote port index compensates for
/// the skipped self-connection. Positions are ascending-dpid order.
#[derive(Debug, Clone)]
pub struct FullMeshPanel {
    dpids: Vec<Dpid>,
}

impl FullMeshPanel {
    /// Creates a full-mesh panel over the given switches.
    ///
    /// # Panics
    ///
    /// Panics if a dpid appears twice.
    #[must_use]
    pub fn new(mut dpids: Vec<Dpid>) -> Self {
        dpids.sort_unstable();
        let before = dpids.len();
        dpids.dedup();
        assert_eq!(before, dpids.len(), "duplicate dpid in mesh");
        Self { dpids }
    }

    fn position(&self, dpid: Dpid) -> Option<usize> {
        self.dpids.binary_search(&dpid).ok()
    }
}

impl PatchPanel for FullMeshPanel {
    fn connected_port(&self, dpid: Dpid, port: PortNo) -> Option<Endpoint> {
        let here = self.position(dpid)?;
        let port_idx = port.index();
        if port_idx >= self.dpids.len().saturating_sub(1) {
            return None;
        }

        // Compensate for the skipped self-connection in both directions.
        let there = if port_idx < here { port_idx } else { port_idx + 1 };
        let remote_port_idx = if here < there { here } else { here - 1 };

        Some(Endpoint {
            dpid: self.dpids[there],
            port: PortNo::from_index(remote_port_idx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn mesh(n: u64) -> FullMeshPanel {
        FullMeshPanel::new((0..n).map(Dpid::new).collect())
    }

    #[test]
    fn three_switch_wiring_matches_the_rule() {
        let panel = mesh(3);
        // Port 1 on s0 (index 0, not < position 0) goes to s1.
        assert_eq!(
            panel.connected_port(Dpid::new(0), PortNo::new(1)),
            Some(Endpoint {
                dpid: Dpid::new(1),
                port: PortNo::new(1),
            })
        );
        // Port 1 on s2 (index 0 < position 2) goes to s0.
        assert_eq!(
            panel.connected_port(Dpid::new(2), PortNo::new(1)),
            Some(Endpoint {
                dpid: Dpid::new(0),
                port: PortNo::new(2),
            })
        );
    }

    #[test]
    fn wiring_is_an_involution() {
        for n in 2..8u64 {
            let panel = mesh(n);
            for s in 0..n {
                for p in 1..n {
                    let dpid = Dpid::new(s);
                    let port = PortNo::new(u16::try_from(p).unwrap());
                    let there = panel.connected_port(dpid, port).expect("wired");
                    let back = panel
                        .connected_port(there.dpid, there.port)
                        .expect("reverse wired");
                    assert_eq!((back.dpid, back.port), (dpid, port), "n={n} s={s} p={p}");
                }
            }
        }
    }

    #[test]
    fn wiring_is_injective() {
        let n = 6u64;
        let panel = mesh(n);
        let mut targets = BTreeSet::new();
        for s in 0..n {
            for p in 1..n {
                let target = panel
                    .connected_port(Dpid::new(s), PortNo::new(u16::try_from(p).unwrap()))
                    .expect("wired");
                assert!(targets.insert(target), "two ports wired to {target}");
            }
        }
    }

    #[test]
    fn never_wired_to_self() {
        let panel = mesh(5);
        for s in 0..5u64 {
            for p in 1..5u16 {
                let target = panel.connected_port(Dpid::new(s), PortNo::new(p)).unwrap();
                assert_ne!(target.dpid, Dpid::new(s));
            }
        }
    }

    #[test]
    fn out_of_range_port_is_unwired() {
        let panel = mesh(3);
        assert!(panel.connected_port(Dpid::new(0), PortNo::new(3)).is_none());
        assert!(panel.connected_port(Dpid::new(9), PortNo::new(1)).is_none());
    }
}
