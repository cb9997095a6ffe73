//! Sentence framer and router.
//!
//! Pure decision logic — takes a raw sentence, returns a [`RelayAction`]
//! telling the caller what to send and where. No I/O, no transport
//! dependency.

use std::net::SocketAddrV4;

use crate::config::RelayConfig;
use crate::groups::Registry;
use crate::tagblock::{build_tag_block, LineCounter};
use crate::types::{now_ms, TalkerId};

/// 6-byte header identifying IEC 61162-450 multicast traffic.
pub const MULTICAST_PREFIX: &[u8; 6] = b"UdPbC\0";

/// A framed sentence ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub destination: SocketAddrV4,
}

/// What to do with a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    /// Send `payload` to the group's destination.
    Send(Datagram),
    /// Do not relay. Never an error — best-effort semantics.
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Sentence too short to carry a talker identifier.
    Undersized,
    /// Talker is in no transmission group.
    UnknownTalker,
}

/// Frames sentences into LWE datagrams.
///
/// Owns the per-session line counter; a new `Framer` (or [`reset`])
/// starts counting at 0.
///
/// [`reset`]: Framer::reset
pub struct Framer {
    registry: Registry,
    config: RelayConfig,
    counter: LineCounter,
}

impl Framer {
    pub fn new(registry: Registry, config: RelayConfig) -> Self {
        Self {
            registry,
            config,
            counter: LineCounter::new(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Zero the line counter (session restart).
    pub fn reset(&mut self) {
        self.counter.reset();
    }

    /// Route and frame one raw sentence.
    pub fn relay(&mut self, sentence: &str) -> RelayAction {
        self.relay_at(sentence, now_ms())
    }

    /// [`relay`](Framer::relay) with an injected timestamp.
    pub fn relay_at(&mut self, sentence: &str, now_ms: u64) -> RelayAction {
        let talker = match TalkerId::from_sentence(sentence) {
            Some(talker) => talker,
            None => return RelayAction::Drop(DropReason::Undersized),
        };
        let group = match self.registry.lookup(&talker) {
            Some(group) => group,
            None => return RelayAction::Drop(DropReason::UnknownTalker),
        };

        let tag_block = build_tag_block(&self.config, &mut self.counter, now_ms);

        let mut payload =
            Vec::with_capacity(MULTICAST_PREFIX.len() + tag_block.len() + sentence.len() + 2);
        if self.config.include_multicast_prefix {
            payload.extend_from_slice(MULTICAST_PREFIX);
        }
        payload.extend_from_slice(tag_block.as_bytes());
        payload.extend_from_slice(sentence.as_bytes());
        payload.extend_from_slice(b"\r\n");

        RelayAction::Send(Datagram {
            payload,
            destination: group.destination(),
        })
    }
}
