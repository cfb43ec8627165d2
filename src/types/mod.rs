//! Core types for the fuzz harness.
//!
//! - [`id`]: Identifier newtypes (`Dpid`, `PortNo`, `MessageId`, `Round`)
//! - [`addr`]: Synthetic hardware addresses

pub mod addr;
pub mod id;

pub use addr::HwAddr;
pub use id::{Dpid, MessageId, PortNo, Round};
