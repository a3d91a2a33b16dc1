//! Network module for packet interception and rewriting.
//!
//! This module contains the components between the kernel packet queue and
//! the verdicts going back to it: the netlink transport, header parsing,
//! the User-Agent rewrite engine, checksum recomputation, and the
//! acquisition loop that drives them.

pub mod checksum;
pub mod packet;
pub mod processing;
pub mod queue;
pub mod rewrite;

// Re-export commonly used types
pub use queue::{IoStatus, NfBuffer, NfPacket, NfQueue, PacketVerdict, QueueError, Transport};
