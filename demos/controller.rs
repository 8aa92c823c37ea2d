//! Minimal Art-Net controller: polls the network and lists replying nodes.
//!
//! Run with `cargo run --example controller`. `ARTNET_IP` and `ARTNET_MASK`
//! select the interface and directed broadcast address.

use std::collections::BTreeMap;
use std::env;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use artnet::packets::{ArtDmx, ArtPoll, Packet, TalkToMe};
use artnet::transport::{ArtNetSocket, SocketConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(2500);
const LISTEN_FOR: Duration = Duration::from_secs(10);

fn env_ip(name: &str) -> Option<Ipv4Addr> {
    env::var(name).ok().and_then(|raw| raw.parse().ok())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("info".parse()?)
                .from_env_lossy(),
        )
        .try_init();

    let mut config = SocketConfig::default();
    if let Some(ip) = env_ip("ARTNET_IP") {
        config = config.with_local_ip(ip);
    }
    if let Some(mask) = env_ip("ARTNET_MASK") {
        config = config.with_subnet_mask(mask);
    }
    let socket = ArtNetSocket::bind(config)?;
    println!(
        "controller on {}, broadcasting to {}",
        socket.local_addr(),
        socket.broadcast_address()
    );

    let mut poll = ArtPoll::new();
    poll.set_talk_to_me(TalkToMe {
        reply_on_change: true,
        ..TalkToMe::default()
    });
    let polling = socket.send_with_interval(&poll, POLL_INTERVAL)?;

    let levels: Vec<u8> = (0..=255).collect();
    socket.send(&ArtDmx::with_data(0, levels))?;

    let mut nodes = BTreeMap::new();
    let deadline = Instant::now() + LISTEN_FOR;
    while Instant::now() < deadline {
        match socket.receive() {
            Ok(Some((Packet::PollReply(reply), source))) => {
                if nodes.insert(source, reply.short_name.clone()).is_none() {
                    println!(
                        "{source}: {} ({}), {} ports, style {}",
                        reply.short_name,
                        reply.long_name,
                        reply.num_ports(),
                        reply.style
                    );
                }
            }
            Ok(_) => {}
            Err(err) => eprintln!("receive failed: {err}"),
        }
    }

    polling.cancel();
    socket.close();
    println!("{} node(s) found", nodes.len());
    Ok(())
}
