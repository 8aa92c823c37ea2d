use std::sync::atomic::{AtomicU64, Ordering};

/// Per-socket datagram counters.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    sent: AtomicU64,
    received: AtomicU64,
    dropped: AtomicU64,
    ignored: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    largest_datagram: AtomicU64,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_sent(&self, len: usize) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(as_u64(len), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self, len: usize) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(as_u64(len), Ordering::Relaxed);
        update_max(&self.largest_datagram, as_u64(len));
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            largest_datagram: self.largest_datagram.load(Ordering::Relaxed),
        }
    }
}

fn as_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn update_max(target: &AtomicU64, candidate: u64) {
    let mut current = target.load(Ordering::Relaxed);
    while candidate > current {
        match target.compare_exchange_weak(
            current,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(old) => current = old,
        }
    }
}

/// Copy of a socket's counters at one point in time.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Datagrams sent
    pub sent: u64,
    /// Datagrams decoded into packets
    pub received: u64,
    /// Datagrams that failed to decode
    pub dropped: u64,
    /// Own or undersized datagrams skipped before decoding
    pub ignored: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes of decoded datagrams
    pub bytes_received: u64,
    /// Largest decoded datagram
    pub largest_datagram: u64,
}

impl MetricsSnapshot {
    /// Mean size of decoded datagrams.
    #[must_use]
    pub const fn avg_datagram_len(&self) -> Option<u64> {
        if self.received == 0 {
            return None;
        }
        Some(self.bytes_received / self.received)
    }
}
