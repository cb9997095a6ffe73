//! Relay session lifecycle.
//!
//! One session owns one outbound transport, bound at start and released
//! at stop. Sentences arrive on up to two host streams (incoming and
//! outgoing) and are framed and sent to completion one at a time — no
//! queueing, no retry.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use lwe_protocol::{Framer, Registry, RelayAction, RelayConfig};

use crate::error::LweRelayError;
use crate::transport::{Transport, UdpMulticastTransport};

/// The host's sentence streams. `None` means the host does not provide
/// that stream; a stream is also skipped when its relay flag is off.
/// Dropping a receiver is the unsubscribe.
#[derive(Default)]
pub struct SentenceSources {
    pub incoming: Option<mpsc::Receiver<String>>,
    pub outgoing: Option<mpsc::Receiver<String>>,
}

/// Advisory status events for the host. Fatal only where noted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Relay is active and sending via `interface`.
    Active { interface: std::net::Ipv4Addr },
    /// Configuration prevents relaying; the session stays inactive.
    ConfigError { reason: String },
    /// A send failed. Fatal for this session — no retry.
    TransportError { reason: String },
}

/// Channels returned to the host when a session starts.
pub struct SessionChannels {
    pub handle: SessionHandle,
    pub events: mpsc::Receiver<SessionEvent>,
}

/// Controls a running session. Dropping the handle also stops it.
pub struct SessionHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Stop the session: sources are detached and the transport released.
    /// Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }

    /// Wait for the session task to finish.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// A relay session. Each `spawn` is a fresh session: new transport, line
/// counter at 0.
pub struct RelaySession;

impl RelaySession {
    /// Start a session with a UDP multicast transport.
    ///
    /// A missing interface address is a non-fatal configuration error:
    /// the returned session reports [`SessionEvent::ConfigError`] and
    /// relays nothing. A socket that cannot be set up is fatal.
    pub fn spawn(
        config: RelayConfig,
        sources: SentenceSources,
    ) -> Result<SessionChannels, LweRelayError> {
        let Some(interface) = config.interface_address else {
            warn!("no interface address specified, relay inactive");
            let (event_tx, event_rx) = mpsc::channel(16);
            let task = tokio::spawn(async move {
                let _ = event_tx
                    .send(SessionEvent::ConfigError {
                        reason: "no address specified".into(),
                    })
                    .await;
            });
            return Ok(SessionChannels {
                handle: SessionHandle {
                    stop_tx: None,
                    task: Some(task),
                },
                events: event_rx,
            });
        };

        let transport = UdpMulticastTransport::bind(interface)?;
        Ok(Self::spawn_with_transport(config, sources, Arc::new(transport)))
    }

    /// Start a session over an already-built transport (test seam).
    pub fn spawn_with_transport(
        config: RelayConfig,
        sources: SentenceSources,
        transport: Arc<dyn Transport>,
    ) -> SessionChannels {
        let (stop_tx, stop_rx) = oneshot::channel();
        let (event_tx, event_rx) = mpsc::channel(16);

        let framer = Framer::new(Registry::standard(), config);
        let task = tokio::spawn(session_loop(framer, sources, transport, event_tx, stop_rx));

        SessionChannels {
            handle: SessionHandle {
                stop_tx: Some(stop_tx),
                task: Some(task),
            },
            events: event_rx,
        }
    }
}

async fn session_loop(
    mut framer: Framer,
    sources: SentenceSources,
    transport: Arc<dyn Transport>,
    events: mpsc::Sender<SessionEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let SentenceSources {
        mut incoming,
        mut outgoing,
    } = sources;
    // Dropping a receiver here is the unsubscribe for a disabled stream.
    if !framer.config().relay_incoming {
        incoming = None;
    }
    if !framer.config().relay_outgoing {
        outgoing = None;
    }

    if let Some(interface) = framer.config().interface_address {
        info!(%interface, "relay session active");
        let _ = events.send(SessionEvent::Active { interface }).await;
    }

    loop {
        if incoming.is_none() && outgoing.is_none() {
            // Host detached every stream — nothing left to relay.
            break;
        }

        tokio::select! {
            _ = &mut stop_rx => break,
            sentence = next_sentence(&mut incoming) => {
                if let Some(sentence) = sentence {
                    if relay_one(&mut framer, &*transport, &events, &sentence).await.is_err() {
                        break;
                    }
                }
            }
            sentence = next_sentence(&mut outgoing) => {
                if let Some(sentence) = sentence {
                    if relay_one(&mut framer, &*transport, &events, &sentence).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!("relay session stopped");
}

/// Receive from an optional stream. A closed stream is taken out of the
/// session (its `None` slot never resolves again); an absent stream
/// pends forever so `select!` ignores it.
async fn next_sentence(source: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match source.as_mut() {
        Some(receiver) => match receiver.recv().await {
            Some(sentence) => Some(sentence),
            None => {
                *source = None;
                None
            }
        },
        None => std::future::pending().await,
    }
}

/// Frame and send one sentence. `Err` means the transport failed and the
/// session must end.
async fn relay_one(
    framer: &mut Framer,
    transport: &dyn Transport,
    events: &mpsc::Sender<SessionEvent>,
    sentence: &str,
) -> Result<(), ()> {
    match framer.relay(sentence) {
        RelayAction::Send(datagram) => {
            debug!(
                destination = %datagram.destination,
                len = datagram.payload.len(),
                "multicasting sentence"
            );
            if let Err(e) = transport.send_to(&datagram.payload, datagram.destination).await {
                warn!(error = %e, "send failed, ending session");
                let _ = events
                    .send(SessionEvent::TransportError {
                        reason: e.to_string(),
                    })
                    .await;
                return Err(());
            }
        }
        RelayAction::Drop(reason) => {
            debug!(?reason, sentence, "sentence not relayed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::time::Duration;

    fn test_config() -> RelayConfig {
        RelayConfig::new()
            .interface_address(Ipv4Addr::new(192, 168, 1, 10))
            .include_timestamp_tag(false)
    }

    /// Poll `condition` until it holds or a 2 s deadline passes.
    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    fn spawn_with_mock(
        config: RelayConfig,
        sources: SentenceSources,
    ) -> (MockTransport, SessionChannels) {
        let mock = MockTransport::new();
        let channels =
            RelaySession::spawn_with_transport(config, sources, Arc::new(mock.clone()));
        (mock, channels)
    }

    #[tokio::test]
    async fn reports_active_with_interface() {
        let (_mock, mut channels) = spawn_with_mock(test_config(), SentenceSources::default());
        let event = channels.events.recv().await.unwrap();
        assert_eq!(
            event,
            SessionEvent::Active {
                interface: Ipv4Addr::new(192, 168, 1, 10)
            }
        );
        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn missing_address_reports_config_error_and_relays_nothing() {
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let mut channels = RelaySession::spawn(RelayConfig::new(), sources).unwrap();

        let event = channels.events.recv().await.unwrap();
        assert_eq!(
            event,
            SessionEvent::ConfigError {
                reason: "no address specified".into()
            }
        );

        // The inactive session never subscribed: the stream is closed.
        channels.handle.join().await;
        assert!(sentence_tx.is_closed());
    }

    #[tokio::test]
    async fn relays_gp_sentence_to_navd() {
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (mock, mut channels) = spawn_with_mock(test_config(), sources);

        sentence_tx
            .send("$GPGLL,5321.45,N,00630.12,W*6D".to_string())
            .await
            .unwrap();
        wait_until(|| !mock.sent().is_empty()).await;

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        let (destination, payload) = &sent[0];
        assert_eq!(
            *destination,
            SocketAddrV4::new(Ipv4Addr::new(239, 192, 0, 4), 60004)
        );
        assert_eq!(
            payload.as_slice(),
            b"UdPbC\0\\s:SK0001*50\\$GPGLL,5321.45,N,00630.12,W*6D\r\n"
        );

        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn unknown_talker_emits_no_datagram() {
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (mock, mut channels) = spawn_with_mock(test_config(), sources);

        sentence_tx.send("$ZZABC,1,2".to_string()).await.unwrap();
        sentence_tx
            .send("$GPGLL,after*6D".to_string())
            .await
            .unwrap();
        wait_until(|| !mock.sent().is_empty()).await;

        // Only the GP sentence made it out; the ZZ one was dropped.
        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.ends_with(b"$GPGLL,after*6D\r\n"));

        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn disabled_outgoing_stream_is_not_subscribed() {
        let (incoming_tx, incoming_rx) = mpsc::channel(4);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(incoming_rx),
            outgoing: Some(outgoing_rx),
        };
        let config = test_config().relay_outgoing(false);
        let (mock, mut channels) = spawn_with_mock(config, sources);

        wait_until(|| outgoing_tx.is_closed()).await;
        assert!(!incoming_tx.is_closed());

        // The outgoing sentence goes nowhere; the incoming one relays.
        incoming_tx
            .send("$GPGLL,in*6D".to_string())
            .await
            .unwrap();
        wait_until(|| !mock.sent().is_empty()).await;
        assert_eq!(mock.sent().len(), 1);

        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn both_streams_feed_one_counter() {
        let (incoming_tx, incoming_rx) = mpsc::channel(4);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(incoming_rx),
            outgoing: Some(outgoing_rx),
        };
        let config = test_config().source_id("").include_line_count_tag(true);
        let (mock, mut channels) = spawn_with_mock(config, sources);

        incoming_tx.send("$GPGLL,a*6D".to_string()).await.unwrap();
        wait_until(|| mock.sent().len() == 1).await;
        outgoing_tx.send("$GPGLL,b*6D".to_string()).await.unwrap();
        wait_until(|| mock.sent().len() == 2).await;

        let sent = mock.sent();
        let first = String::from_utf8(sent[0].1.clone()).unwrap();
        let second = String::from_utf8(sent[1].1.clone()).unwrap();
        assert!(first.contains("n:0*"), "first: {first}");
        assert!(second.contains("n:1*"), "second: {second}");

        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn line_count_restarts_at_zero_per_session() {
        let config = test_config().source_id("").include_line_count_tag(true);

        // First session relays a few tagged sentences.
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (mock, mut channels) = spawn_with_mock(config.clone(), sources);
        for _ in 0..3 {
            sentence_tx.send("$GPGLL,x*6D".to_string()).await.unwrap();
        }
        wait_until(|| mock.sent().len() == 3).await;
        channels.handle.stop();
        channels.handle.join().await;

        // A fresh session starts counting at 0 again.
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (mock, mut channels) = spawn_with_mock(config, sources);
        sentence_tx.send("$GPGLL,y*6D".to_string()).await.unwrap();
        wait_until(|| !mock.sent().is_empty()).await;

        let payload = String::from_utf8(mock.sent()[0].1.clone()).unwrap();
        assert!(payload.contains("n:0*"), "payload: {payload}");

        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn send_failure_is_fatal_for_the_session() {
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (mock, mut channels) = spawn_with_mock(test_config(), sources);
        mock.set_fail_sends(true);

        // Drain the Active event first.
        assert!(matches!(
            channels.events.recv().await,
            Some(SessionEvent::Active { .. })
        ));

        sentence_tx.send("$GPGLL,z*6D".to_string()).await.unwrap();
        match channels.events.recv().await {
            Some(SessionEvent::TransportError { reason }) => {
                assert!(reason.contains("send failed"), "reason: {reason}");
            }
            other => panic!("expected TransportError, got {other:?}"),
        }

        // The session is gone: its stream is unsubscribed.
        channels.handle.join().await;
        assert!(sentence_tx.is_closed());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (_mock, mut channels) = spawn_with_mock(test_config(), SentenceSources::default());
        channels.handle.stop();
        channels.handle.stop();
        channels.handle.join().await;
    }

    #[tokio::test]
    async fn session_ends_when_host_detaches_all_streams() {
        let (sentence_tx, sentence_rx) = mpsc::channel(4);
        let sources = SentenceSources {
            incoming: Some(sentence_rx),
            outgoing: None,
        };
        let (_mock, channels) = spawn_with_mock(test_config(), sources);

        drop(sentence_tx);
        channels.handle.join().await;
    }
}
