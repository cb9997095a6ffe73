//! Feed NMEA 0183 sentences from stdin onto IEC 61162-450 multicast groups.
//!
//! ```text
//! cat nmea.log | lwe-relay --interface 192.168.1.10 --line-count
//! ```

use std::net::Ipv4Addr;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use lwe_protocol::RelayConfig;
use lwe_relay::{RelaySession, SentenceSources, SessionEvent};

#[derive(Debug, Parser)]
#[command(name = "lwe-relay", version, about = "Relay NMEA 0183 sentences onto IEC 61162-450 multicast groups")]
struct Args {
    /// IP address of the interface to send multicast datagrams on.
    #[arg(long)]
    interface: Ipv4Addr,

    /// Do not prefix datagrams with the UdPbC\0 multicast header.
    #[arg(long)]
    no_prefix: bool,

    /// Do not include the c: timestamp field in the TAG block.
    #[arg(long)]
    no_timestamp: bool,

    /// Include the n: line count field in the TAG block.
    #[arg(long)]
    line_count: bool,

    /// d: destination identification for the TAG block.
    #[arg(long, default_value = "")]
    destination_id: String,

    /// s: source identification for the TAG block.
    #[arg(long, default_value = "SK0001")]
    source_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = RelayConfig::new()
        .interface_address(args.interface)
        .include_multicast_prefix(!args.no_prefix)
        .include_timestamp_tag(!args.no_timestamp)
        .include_line_count_tag(args.line_count)
        .destination_id(args.destination_id)
        .source_id(args.source_id);

    let (sentence_tx, sentence_rx) = mpsc::channel(64);
    let feeder = tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let sentence = line.trim_end().to_string();
            if sentence.is_empty() {
                continue;
            }
            if sentence_tx.send(sentence).await.is_err() {
                break;
            }
        }
    });

    let sources = SentenceSources {
        incoming: Some(sentence_rx),
        outgoing: None,
    };
    let mut channels = RelaySession::spawn(config, sources)?;

    while let Some(event) = channels.events.recv().await {
        match event {
            SessionEvent::Active { interface } => {
                tracing::info!(%interface, "relay active");
            }
            SessionEvent::ConfigError { reason } => {
                tracing::error!(%reason, "configuration error");
                break;
            }
            SessionEvent::TransportError { reason } => {
                tracing::error!(%reason, "transport error");
                break;
            }
        }
    }

    feeder.abort();
    channels.handle.join().await;
    Ok(())
}
