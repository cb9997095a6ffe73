//! IEC 61162-450 ("Lightweight Ethernet") sentence routing and framing.
//!
//! Classifies NMEA 0183 sentences by talker identifier into transmission
//! groups and wraps them in the LWE wire envelope (multicast prefix, TAG
//! block, CR LF terminator). Pure logic — no sockets, no async. The
//! `lwe-relay` crate owns the transport.

pub mod config;
pub mod error;
pub mod framer;
pub mod groups;
pub mod tagblock;
pub mod types;

pub use config::RelayConfig;
pub use error::LweProtocolError;
pub use framer::{Datagram, DropReason, Framer, RelayAction, MULTICAST_PREFIX};
pub use groups::{Registry, TransmissionGroup, TRANSMISSION_GROUPS};
pub use tagblock::{build_tag_block, xor_checksum, LineCounter, MAX_LINE_COUNT};
pub use types::{now_ms, TalkerId};
