use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::LweRelayError;

/// Outbound transport for one relay session.
///
/// In production: UDP multicast via [`UdpMulticastTransport`].
/// In tests: a mock that records sends.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Fire-and-forget send of one framed datagram.
    async fn send_to(&self, payload: &[u8], destination: SocketAddrV4)
        -> Result<(), LweRelayError>;
}

/// UDP socket with the multicast egress interface pinned.
///
/// std/tokio sockets do not expose `IP_MULTICAST_IF`, so the socket is
/// built with socket2 and handed to tokio afterwards.
pub struct UdpMulticastTransport {
    socket: tokio::net::UdpSocket,
}

impl UdpMulticastTransport {
    /// Bind an ephemeral UDP socket sending multicast via `interface`.
    ///
    /// TTL is left at 1: IEC 61162-450 traffic stays on the local segment.
    pub fn bind(interface: Ipv4Addr) -> Result<Self, LweRelayError> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(LweRelayError::Bind)?;
        socket
            .bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)).into())
            .map_err(LweRelayError::Bind)?;
        socket
            .set_multicast_if_v4(&interface)
            .map_err(LweRelayError::Bind)?;
        socket
            .set_multicast_ttl_v4(1)
            .map_err(LweRelayError::Bind)?;
        socket.set_nonblocking(true).map_err(LweRelayError::Bind)?;

        let socket =
            tokio::net::UdpSocket::from_std(socket.into()).map_err(LweRelayError::Bind)?;
        Ok(Self { socket })
    }
}

#[async_trait::async_trait]
impl Transport for UdpMulticastTransport {
    async fn send_to(
        &self,
        payload: &[u8],
        destination: SocketAddrV4,
    ) -> Result<(), LweRelayError> {
        self.socket
            .send_to(payload, SocketAddr::V4(destination))
            .await
            .map_err(LweRelayError::Send)?;
        Ok(())
    }
}

// ── MockTransport (tests) ───────────────────────────────────────────
