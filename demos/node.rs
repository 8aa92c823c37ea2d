//! Minimal Art-Net node: answers polls and prints incoming DMX.
//!
//! Run with `cargo run --example node`. Set `ARTNET_IP` to bind a specific
//! interface and `ARTNET_RUN_SECS` to change how long the node stays up.
//! `RUST_LOG=artnet=debug` shows socket activity.

use std::env;
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use artnet::packets::{ArtPollReply, Packet, StyleCode};
use artnet::transport::{ArtNetSocket, SocketConfig};

const DEFAULT_RUN_SECS: u64 = 30;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("info".parse()?)
                .from_env_lossy(),
        )
        .try_init();

    let local_ip = env::var("ARTNET_IP")
        .ok()
        .and_then(|raw| raw.parse::<Ipv4Addr>().ok())
        .unwrap_or(Ipv4Addr::UNSPECIFIED);
    let run_for = env::var("ARTNET_RUN_SECS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RUN_SECS);

    let socket = ArtNetSocket::bind(SocketConfig::default().with_local_ip(local_ip))?;
    println!("Art-Net node listening on {}", socket.local_addr());

    let mut reply = ArtPollReply::new();
    reply.set_ip(local_ip);
    reply.short_name = "artnet-rs node".into();
    reply.long_name = "Art-Net demo node".into();
    reply.node_report = "#0001 [0000] ready".into();
    reply.style = StyleCode::Node;
    reply.set_num_ports(1);
    reply.port_types = [0x80, 0, 0, 0];

    let responder = socket.clone();
    let receiver = socket.spawn_receiver(move |packet, source| match packet {
        Packet::Poll(_) => {
            if let Err(err) = responder.send_to(&reply, source) {
                eprintln!("poll reply to {source} failed: {err}");
            }
        }
        Packet::Dmx(dmx) => {
            let preview: Vec<_> = dmx.data.iter().take(16).collect();
            println!(
                "DMX from {source}: universe {:#06x}, seq {}, {} channels {preview:?}",
                dmx.port_address(),
                dmx.sequence,
                dmx.length()
            );
        }
        other => println!("{} from {source}", other.op_code()),
    })?;

    thread::sleep(Duration::from_secs(run_for));
    socket.close();
    let _ = receiver.join();

    let metrics = socket.metrics();
    println!(
        "received {} packets ({} dropped, {} ignored), sent {}",
        metrics.received, metrics.dropped, metrics.ignored, metrics.sent
    );
    Ok(())
}
