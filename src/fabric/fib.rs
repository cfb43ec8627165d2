//! Forwarding state: flow tables, entries, matches, and actions.
//!
//! This is the minimal per-entry shape the invariant checker bridge needs:
//! a destination match plus an ordered action list. Only output actions are
//! interpreted by the CSV export; an entry whose action list contains none
//! is a drop entry.

use crate::types::PortNo;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// A match over packet destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowMatch {
    /// Destination network and prefix length, if the entry matches on one.
    /// `None` matches everything (exported as `0.0.0.0/0`).
    pub nw_dst: Option<(Ipv4Addr, u8)>,
}

impl FlowMatch {
    /// A match on a destination network.
    #[must_use]
    pub fn nw_dst(addr: Ipv4Addr, prefix: u8) -> Self {
        assert!(prefix <= 32, "prefix length out of range: {prefix}");
        Self {
            nw_dst: Some((addr, prefix)),
        }
    }

    /// The wildcard match.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }
}

/// An action applied to matching packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    /// Forward out of the given port.
    Output(PortNo),
    /// Punt to the controller.
    Controller,
}

/// One forwarding entry: a match and its ordered action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEntry {
    /// What the entry matches.
    pub matching: FlowMatch,
    /// Actions applied in order; entries with no output action drop.
    pub actions: Vec<FlowAction>,
}

impl FlowEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(matching: FlowMatch, actions: Vec<FlowAction>) -> Self {
        Self { matching, actions }
    }

    /// The first output port in the action list, if any.
    #[must_use]
    pub fn output_port(&self) -> Option<PortNo> {
        self.actions.iter().find_map(|action| match action {
            FlowAction::Output(port) => Some(*port),
            FlowAction::Controller => None,
        })
    }
}

/// A switch's forwarding table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTable {
    entries: Vec<FlowEntry>,
}

impl FlowTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: FlowEntry) {
        self.entries.push(entry);
    }

    /// The entries in installation order.
    #[must_use]
    pub fn entries(&self) -> &[FlowEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
