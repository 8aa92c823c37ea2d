//! Blocking UDP socket for Art-Net traffic.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, instrument, trace, warn};

use super::error::{Result, TransportError};
use super::metrics::{Metrics, MetricsSnapshot};
use crate::packets::{ArtNetPacket, PORT, Packet};

/// Shortest datagram that can hold an Art-Net packet
pub const MIN_DATAGRAM_LEN: usize = 13;

/// Socket configuration options.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Address to bind; also the source of the broadcast address.
    pub local_ip: Ipv4Addr,
    /// Subnet mask for directed broadcast. Limited broadcast when unset.
    pub subnet_mask: Option<Ipv4Addr>,
    /// Port to bind and to send to.
    pub port: u16,
    /// Read timeout. Receivers notice [`ArtNetSocket::close`] only when a
    /// read returns, so leave this set when using
    /// [`spawn_receiver`](ArtNetSocket::spawn_receiver).
    pub read_timeout: Option<Duration>,
    /// Receive buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::UNSPECIFIED,
            subnet_mask: None,
            port: PORT,
            read_timeout: Some(Duration::from_millis(250)),
            buffer_size: 1500,
        }
    }
}

impl SocketConfig {
    /// Set the local address.
    #[must_use]
    pub const fn with_local_ip(mut self, local_ip: Ipv4Addr) -> Self {
        self.local_ip = local_ip;
        self
    }

    /// Set the subnet mask.
    #[must_use]
    pub const fn with_subnet_mask(mut self, subnet_mask: Ipv4Addr) -> Self {
        self.subnet_mask = Some(subnet_mask);
        self
    }

    /// Set the port. Port 0 binds an ephemeral port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the receive buffer size.
    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// Directed broadcast address for `ip` under `mask`, or the limited
/// broadcast address without a mask.
#[must_use]
pub fn broadcast_address(ip: Ipv4Addr, mask: Option<Ipv4Addr>) -> Ipv4Addr {
    match mask {
        Some(mask) => Ipv4Addr::from(u32::from(ip) | !u32::from(mask)),
        None => Ipv4Addr::BROADCAST,
    }
}

/// Art-Net endpoint bound to a UDP port.
///
/// Cloning shares the socket. Interval senders and receiver threads hold
/// a clone and stop once [`close`](Self::close) is called.
#[derive(Clone, Debug)]
pub struct ArtNetSocket {
    inner: Arc<SocketInner>,
}

#[derive(Debug)]
struct SocketInner {
    socket: UdpSocket,
    config: SocketConfig,
    local_addr: SocketAddr,
    metrics: Metrics,
    closed: AtomicBool,
}

impl SocketInner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn send(&self, bytes: &[u8], addr: SocketAddr) -> Result<usize> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let len = self.socket.send_to(bytes, addr)?;
        self.metrics.record_sent(len);
        trace!(%addr, len, "datagram sent");
        Ok(len)
    }

    fn repeat(&self, bytes: &[u8], addr: SocketAddr, interval: Duration, cancel: &AtomicBool) {
        let mut next = Instant::now();
        while !cancel.load(Ordering::Acquire) && !self.is_closed() {
            let now = Instant::now();
            if now < next {
                thread::park_timeout(next - now);
                continue;
            }
            if let Err(err) = self.send(bytes, addr) {
                warn!(%addr, error = %err, "interval send failed");
            }
            next = now + interval;
        }
        debug!(%addr, "interval send stopped");
    }
}

impl ArtNetSocket {
    /// Bind with broadcast enabled.
    #[instrument(level = "info", skip(config), fields(ip = %config.local_ip, port = config.port))]
    pub fn bind(config: SocketConfig) -> Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(config.local_ip, config.port))?;
        socket.set_broadcast(true)?;
        socket.set_read_timeout(config.read_timeout)?;
        let local_addr = socket.local_addr()?;
        debug!(%local_addr, "socket bound");
        Ok(Self {
            inner: Arc::new(SocketInner {
                socket,
                config,
                local_addr,
                metrics: Metrics::default(),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Address the socket is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Configuration the socket was bound with.
    #[must_use]
    pub fn config(&self) -> &SocketConfig {
        &self.inner.config
    }

    /// Address [`send`](Self::send) targets.
    #[must_use]
    pub fn broadcast_address(&self) -> Ipv4Addr {
        broadcast_address(self.inner.config.local_ip, self.inner.config.subnet_mask)
    }

    /// Counters since the socket was bound.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn broadcast_target(&self) -> SocketAddr {
        SocketAddr::from((self.broadcast_address(), self.inner.config.port))
    }

    /// Broadcast a packet.
    pub fn send<P: ArtNetPacket>(&self, packet: &P) -> Result<usize> {
        self.send_to(packet, self.broadcast_target())
    }

    /// Unicast a packet to `ip` on the configured port.
    pub fn send_to_ip<P: ArtNetPacket>(&self, packet: &P, ip: Ipv4Addr) -> Result<usize> {
        self.send_to(packet, SocketAddr::from((ip, self.inner.config.port)))
    }

    /// Send a packet to an explicit address.
    #[instrument(level = "trace", skip(self, packet), fields(op_code = %P::OP_CODE))]
    pub fn send_to<P: ArtNetPacket>(&self, packet: &P, addr: SocketAddr) -> Result<usize> {
        let bytes = packet.to_bytes()?;
        self.inner.send(&bytes, addr)
    }

    /// Send an already encoded datagram.
    pub fn send_bytes_to(&self, bytes: &[u8], addr: SocketAddr) -> Result<usize> {
        self.inner.send(bytes, addr)
    }

    /// Broadcast a packet now and then every `interval`.
    pub fn send_with_interval<P: ArtNetPacket>(
        &self,
        packet: &P,
        interval: Duration,
    ) -> Result<IntervalHandle> {
        self.send_to_with_interval(packet, self.broadcast_target(), interval)
    }

    /// Unicast a packet to `ip` now and then every `interval`.
    pub fn send_to_ip_with_interval<P: ArtNetPacket>(
        &self,
        packet: &P,
        ip: Ipv4Addr,
        interval: Duration,
    ) -> Result<IntervalHandle> {
        let addr = SocketAddr::from((ip, self.inner.config.port));
        self.send_to_with_interval(packet, addr, interval)
    }

    /// Send a packet to `addr` now and then every `interval` until the
    /// returned handle is cancelled or dropped, or the socket is closed.
    /// The packet is encoded once up front.
    #[instrument(level = "debug", skip(self, packet), fields(op_code = %P::OP_CODE))]
    pub fn send_to_with_interval<P: ArtNetPacket>(
        &self,
        packet: &P,
        addr: SocketAddr,
        interval: Duration,
    ) -> Result<IntervalHandle> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let bytes = packet.to_bytes()?;
        let interval = interval.max(Duration::from_millis(1));
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let inner = Arc::clone(&self.inner);
        let thread = thread::Builder::new()
            .name("artnet-interval".into())
            .spawn(move || inner.repeat(&bytes, addr, interval, &flag))?;
        Ok(IntervalHandle {
            cancel,
            thread: Some(thread),
        })
    }

    /// Receive one datagram.
    ///
    /// Returns `Ok(None)` when the read timed out, or when the datagram came
    /// from this socket or is too short to be Art-Net. A datagram that fails
    /// to decode is returned as [`TransportError::Packet`].
    #[instrument(level = "trace", skip(self))]
    pub fn receive(&self) -> Result<Option<(Packet, SocketAddr)>> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let mut buf = vec![0u8; self.inner.config.buffer_size];
        let (len, source) = match self.inner.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        if source == self.inner.local_addr || len < MIN_DATAGRAM_LEN {
            self.inner.metrics.record_ignored();
            trace!(%source, len, "datagram ignored");
            return Ok(None);
        }
        match Packet::from_bytes(&buf[..len]) {
            Ok(packet) => {
                self.inner.metrics.record_received(len);
                trace!(%source, op_code = %packet.op_code(), len, "packet received");
                Ok(Some((packet, source)))
            }
            Err(err) => {
                self.inner.metrics.record_dropped();
                Err(err.into())
            }
        }
    }

    /// Receive on a background thread, handing each packet to `handler`.
    ///
    /// Malformed datagrams are logged and skipped. The thread exits when the
    /// socket is closed or the underlying socket fails.
    pub fn spawn_receiver<F>(&self, mut handler: F) -> Result<JoinHandle<()>>
    where
        F: FnMut(Packet, SocketAddr) + Send + 'static,
    {
        let socket = self.clone();
        let thread = thread::Builder::new()
            .name("artnet-receiver".into())
            .spawn(move || {
                debug!(local_addr = %socket.local_addr(), "receiver started");
                loop {
                    match socket.receive() {
                        Ok(Some((packet, source))) => handler(packet, source),
                        Ok(None) => {}
                        Err(TransportError::Packet(err)) => {
                            warn!(error = %err, "discarding malformed datagram");
                        }
                        Err(TransportError::Closed) => break,
                        Err(TransportError::Io(err)) => {
                            warn!(error = %err, "receive failed");
                            break;
                        }
                    }
                }
                debug!("receiver stopped");
            })?;
        Ok(thread)
    }

    /// Stop receivers and interval senders. Later sends and receives fail
    /// with [`TransportError::Closed`].
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!(local_addr = %self.inner.local_addr, "socket closed");
        }
    }
}

/// Handle to a periodic sender. Dropping it stops the sender.
#[derive(Debug)]
pub struct IntervalHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl IntervalHandle {
    /// Whether the sender thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Stop the sender and wait for its thread.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                warn!("interval sender panicked");
            }
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::{ArtDmx, ArtPoll};

    fn loopback() -> ArtNetSocket {
        let config = SocketConfig::default()
            .with_local_ip(Ipv4Addr::LOCALHOST)
            .with_port(0)
            .with_read_timeout(Some(Duration::from_millis(500)));
        ArtNetSocket::bind(config).unwrap()
    }

    #[test]
    fn test_broadcast_address() {
        assert_eq!(
            broadcast_address(
                Ipv4Addr::new(192, 168, 1, 20),
                Some(Ipv4Addr::new(255, 255, 255, 0))
            ),
            Ipv4Addr::new(192, 168, 1, 255)
        );
        assert_eq!(
            broadcast_address(Ipv4Addr::new(10, 1, 2, 3), Some(Ipv4Addr::new(255, 0, 0, 0))),
            Ipv4Addr::new(10, 255, 255, 255)
        );
        assert_eq!(
            broadcast_address(Ipv4Addr::new(10, 1, 2, 3), None),
            Ipv4Addr::BROADCAST
        );
    }

    #[test]
    fn test_default_config() {
        let config = SocketConfig::default();
        assert_eq!(config.port, 0x1936);
        assert_eq!(config.local_ip, Ipv4Addr::UNSPECIFIED);
        assert!(config.read_timeout.is_some());
    }

    #[test]
    fn test_send_and_receive() {
        let node = loopback();
        let controller = loopback();
        let dmx = ArtDmx::with_data(1, vec![10, 20, 30]);
        controller.send_to(&dmx, node.local_addr()).unwrap();

        let (packet, source) = node.receive().unwrap().unwrap();
        assert_eq!(source, controller.local_addr());
        assert_eq!(packet, Packet::Dmx(dmx));
        assert_eq!(node.metrics().received, 1);
        assert_eq!(controller.metrics().sent, 1);
    }

    #[test]
    fn test_own_and_short_datagrams_are_ignored() {
        let node = loopback();
        let other = loopback();
        node.send_to(&ArtPoll::new(), node.local_addr()).unwrap();
        assert!(node.receive().unwrap().is_none());

        other.send_bytes_to(b"Art-Net\0\x00\x20\x00\x0e", node.local_addr()).unwrap();
        assert!(node.receive().unwrap().is_none());
        assert_eq!(node.metrics().ignored, 2);
    }

    #[test]
    fn test_malformed_datagram_is_error() {
        let node = loopback();
        let other = loopback();
        other.send_bytes_to(b"Not-Art\0\x00\x20\x00\x0e\x00", node.local_addr()).unwrap();
        assert!(matches!(node.receive(), Err(TransportError::Packet(_))));
        assert_eq!(node.metrics().dropped, 1);
    }

    #[test]
    fn test_closed_socket_rejects_io() {
        let socket = loopback();
        socket.close();
        assert!(socket.is_closed());
        assert!(matches!(
            socket.send_to(&ArtPoll::new(), socket.local_addr()),
            Err(TransportError::Closed)
        ));
        assert!(matches!(socket.receive(), Err(TransportError::Closed)));
    }
}
