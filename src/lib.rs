//! # uamask - User-Agent masking at the router
//!
//! uamask is a privileged daemon for embedded Linux routers. A firewall
//! rule diverts outbound packets into a kernel packet queue
//! (`iptables ... -j NFQUEUE`); uamask receives each queued packet,
//! rewrites the HTTP `User-Agent` request header in place, fixes the TCP
//! checksum, and accepts the packet so the kernel resumes delivery. This
//! defeats User-Agent-based traffic classification (tethering detection
//! and the like) for every device behind the router at once.
//!
//! ## Design
//!
//! * Single blocking thread: receive, parse, rewrite, verdict, in arrival
//!   order
//! * Length-preserving rewrites: the substitute is truncated or padded to
//!   the original value span, so no length field outside the TCP checksum
//!   ever needs adjusting
//! * Parse uncertainty always passes traffic through unchanged
//! * One-shot fault recovery: a failing queue session is reopened once
//!   with conntrack disabled before giving up
//!
//! ## Quick Start
//!
//! ```text
//! iptables -t mangle -A POSTROUTING -p tcp --dport 80 -j NFQUEUE --queue-num 10010
//! uamask --config /etc/uamask.toml
//! ```

/// Command-line surface
pub mod cli;
/// Runtime configuration
pub mod config;
/// Centralized error handling
pub mod error;
/// Packet queue transport, rewrite engine, and acquisition loop
pub mod network;
/// Signal-driven shutdown flag
pub mod shutdown;
/// Packet processing counters
pub mod stats;

// Re-export commonly used types
pub use error::{Result, UamaskError};
