use std::net::Ipv4Addr;

use serde::{Deserialize, Deserializer};

use crate::error::LweProtocolError;

/// Relay configuration.
///
/// Deserializes from the JSON options object the host hands the relay;
/// field names follow that schema. Rust callers use the builder:
///
/// ```rust
/// use lwe_protocol::RelayConfig;
///
/// let config = RelayConfig::new()
///     .interface_address("192.168.1.10".parse().unwrap())
///     .include_line_count_tag(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Local IP address used as the multicast egress interface.
    ///
    /// Required for active operation; `None` (or an empty string in the
    /// host options) leaves the session inactive with an error status.
    #[serde(rename = "ipaddress", deserialize_with = "interface_from_host")]
    pub interface_address: Option<Ipv4Addr>,
    /// Relay sentences from the host's incoming-sentence stream.
    #[serde(rename = "nmea0183")]
    pub relay_incoming: bool,
    /// Relay sentences from the host's outgoing-sentence stream.
    #[serde(rename = "nmea0183out")]
    pub relay_outgoing: bool,
    /// Prefix each datagram with the `UdPbC\0` header.
    #[serde(rename = "includeMulticastPrefix")]
    pub include_multicast_prefix: bool,
    /// Include the `c:` Unix-millisecond timestamp in the TAG block.
    #[serde(rename = "includeTimestampInTag")]
    pub include_timestamp_tag: bool,
    /// Include the `n:` line count in the TAG block.
    #[serde(rename = "includeLineCountInTag")]
    pub include_line_count_tag: bool,
    /// `d:` destination identification for the TAG block.
    #[serde(rename = "tagDestinationIdentification")]
    pub destination_id: String,
    /// `s:` source identification for the TAG block.
    #[serde(rename = "tagSourceIdentification")]
    pub source_id: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayConfig {
    /// Create a config with the defaults of the host options schema.
    pub fn new() -> Self {
        Self {
            interface_address: None,
            relay_incoming: true,
            relay_outgoing: true,
            include_multicast_prefix: true,
            include_timestamp_tag: true,
            include_line_count_tag: false,
            destination_id: String::new(),
            source_id: "SK0001".to_string(),
        }
    }

    /// Parse a config from the host's JSON options object.
    pub fn from_json(options: &str) -> Result<Self, LweProtocolError> {
        serde_json::from_str(options).map_err(Into::into)
    }

    /// Set the multicast egress interface address.
    pub fn interface_address(mut self, address: Ipv4Addr) -> Self {
        self.interface_address = Some(address);
        self
    }

    /// Relay the incoming-sentence stream (default: true).
    pub fn relay_incoming(mut self, enabled: bool) -> Self {
        self.relay_incoming = enabled;
        self
    }

    /// Relay the outgoing-sentence stream (default: true).
    pub fn relay_outgoing(mut self, enabled: bool) -> Self {
        self.relay_outgoing = enabled;
        self
    }

    /// Prefix datagrams with `UdPbC\0` (default: true).
    pub fn include_multicast_prefix(mut self, enabled: bool) -> Self {
        self.include_multicast_prefix = enabled;
        self
    }

    /// Include the `c:` timestamp field (default: true).
    pub fn include_timestamp_tag(mut self, enabled: bool) -> Self {
        self.include_timestamp_tag = enabled;
        self
    }

    /// Include the `n:` line count field (default: false).
    pub fn include_line_count_tag(mut self, enabled: bool) -> Self {
        self.include_line_count_tag = enabled;
        self
    }

    /// Set the `d:` destination identification (default: empty, omitted).
    pub fn destination_id(mut self, id: impl Into<String>) -> Self {
        self.destination_id = id.into();
        self
    }

    /// Set the `s:` source identification (default: `"SK0001"`).
    pub fn source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = id.into();
        self
    }
}

/// The host schema carries the interface as a string; an empty string
/// means "not configured".
fn interface_from_host<'de, D>(deserializer: D) -> Result<Option<Ipv4Addr>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(address) => address.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
