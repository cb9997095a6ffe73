//! NMEA 0183 TAG block construction.
//!
//! The TAG block is a backslash-delimited metadata prefix:
//! `\d:...,s:...,c:...,n:...*hh\` where `hh` is the 8-bit XOR of the
//! joined field string in lowercase hex, no width padding. IEC 61162-450
//! transmits it between the multicast header and the sentence.

use crate::config::RelayConfig;

/// Line count wraps to 0 at this value.
pub const MAX_LINE_COUNT: u32 = 1000;

/// Per-session line counter for the `n:` TAG field.
///
/// Lives in session state and is handed `&mut` to the framer — one
/// synchronous framing path per session, so no atomics needed.
#[derive(Debug, Default)]
pub struct LineCounter(u32);

impl LineCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Current value, then advance with wraparound at [`MAX_LINE_COUNT`].
    pub fn next(&mut self) -> u32 {
        let value = self.0;
        self.0 = (self.0 + 1) % MAX_LINE_COUNT;
        value
    }

    /// Reset to 0 (session start).
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// 8-bit XOR over every byte of `fields`.
pub fn xor_checksum(fields: &str) -> u8 {
    fields.bytes().fold(0, |acc, byte| acc ^ byte)
}

/// Build the TAG block for one sentence.
///
/// Field order is fixed (`d:`, `s:`, `c:`, `n:`) — it determines the
/// checksum input. An empty field list yields an empty string: no
/// delimiters are emitted at all. `now_ms` is injected by the caller so
/// framing stays deterministic under test.
pub fn build_tag_block(config: &RelayConfig, counter: &mut LineCounter, now_ms: u64) -> String {
    let mut fields: Vec<String> = Vec::new();
    if !config.destination_id.is_empty() {
        fields.push(format!("d:{}", config.destination_id));
    }
    if !config.source_id.is_empty() {
        fields.push(format!("s:{}", config.source_id));
    }
    if config.include_timestamp_tag {
        fields.push(format!("c:{now_ms}"));
    }
    if config.include_line_count_tag {
        fields.push(format!("n:{}", counter.next()));
    }

    if fields.is_empty() {
        return String::new();
    }

    let joined = fields.join(",");
    let checksum = xor_checksum(&joined);
    format!("\\{joined}*{checksum:x}\\")
}
