//! IEC 61162-450 relay session runtime.
//!
//! Owns the outbound multicast transport for one relay session, consumes
//! the host's sentence streams over channels, frames each sentence via
//! [`lwe_protocol`], and reports status back to the host as events.

pub mod error;
pub mod session;
pub mod transport;

pub use error::LweRelayError;
pub use session::{RelaySession, SentenceSources, SessionChannels, SessionEvent, SessionHandle};
pub use transport::{Transport, UdpMulticastTransport};
