/// Relay-session errors.
///
/// Wraps framing errors and adds transport-specific variants. A missing
/// interface address is *not* represented here — it is reported as a
/// [`SessionEvent::ConfigError`](crate::session::SessionEvent) status and
/// leaves the session inactive rather than failing the caller.
#[derive(Debug, thiserror::Error)]
pub enum LweRelayError {
    #[error("protocol error: {0}")]
    Protocol(#[from] lwe_protocol::LweProtocolError),

    #[error("socket setup failed: {0}")]
    Bind(#[source] std::io::Error),

    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),
}
