use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::RtpPacket;

/// Loss/arrival accounting for one receive direction, independent of the
/// jitter buffer's own skip counter; this measures raw socket arrival order.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    pub packets_received: AtomicU64,
    pub bytes_received: AtomicU64,
    pub packets_lost: AtomicU64,
    pub parse_errors: AtomicU64,
    last_sequence: AtomicU16,
    has_last_sequence: std::sync::atomic::AtomicBool,
}

impl ReceiverStats {
    fn record(&self, seq: u16) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);

        if self.has_last_sequence.swap(true, Ordering::Relaxed) {
            let last = self.last_sequence.load(Ordering::Relaxed);
            let expected = last.wrapping_add(1);
            let diff = seq.wrapping_sub(expected);
            if diff != 0 && diff < 0x8000 {
                self.packets_lost.fetch_add(diff as u64, Ordering::Relaxed);
            }
        }
        self.last_sequence.store(seq, Ordering::Relaxed);
    }
}

/// Binds one UDP socket and invokes a callback per parsed datagram. Can
/// optionally drop datagrams whose source port matches Janus's own outbound
/// RTP port, so echoed mixed audio never re-enters the pipeline as input.
pub struct RtpReceiver {
    socket: Arc<UdpSocket>,
    stats: Arc<ReceiverStats>,
    ignore_source_port: std::sync::atomic::AtomicU16,
    has_ignore_port: std::sync::atomic::AtomicBool,
}

impl RtpReceiver {
    pub async fn bind(host: &str, port: u16) -> Result<Self, Error> {
        let addr = format!("{host}:{port}");
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;

        Ok(Self {
            socket: Arc::new(socket),
            stats: Arc::new(ReceiverStats::default()),
            ignore_source_port: std::sync::atomic::AtomicU16::new(0),
            has_ignore_port: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Exposes the underlying socket so an `RtpSender` can share it (the
    /// shared-socket contract required by Janus plain-RTP participants).
    pub fn shared_socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        self.stats.clone()
    }

    pub fn set_ignore_source_port(&self, port: u16) {
        self.ignore_source_port.store(port, Ordering::Relaxed);
        self.has_ignore_port.store(true, Ordering::Relaxed);
    }

    /// Runs the receive loop, sending every accepted packet on `tx`. Returns
    /// when the socket errors (treated by the caller as a normal shutdown
    /// signal once the socket has been closed deliberately).
    pub async fn run(self: Arc<Self>, tx: mpsc::Sender<RtpPacket>) {
        let mut buf = [0u8; 2048];
        loop {
            let (len, from) = match self.socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(err) => {
                    warn!(?err, "rtp receiver socket closed, exiting receive loop");
                    return;
                }
            };

            if self.has_ignore_port.load(Ordering::Relaxed)
                && from.port() == self.ignore_source_port.load(Ordering::Relaxed)
            {
                trace!(port = from.port(), "dropping echoed packet from ignored source port");
                continue;
            }

            let Some(packet) = RtpPacket::parse(&buf[..len]) else {
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            self.stats.record(packet.sequence_number);
            self.stats
                .bytes_received
                .fetch_add(len as u64, Ordering::Relaxed);

            if tx.send(packet).await.is_err() {
                debug!("rtp receiver channel closed, exiting receive loop");
                return;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SenderStats {
    pub packets_sent: AtomicU64,
    pub bytes_sent: AtomicU64,
}

/// Sends RTP datagrams either from its own bound socket or, preferably, from
/// a socket shared with an `RtpReceiver`. Janus plain-RTP participants
/// require outbound packets to originate from the address they registered.
pub struct RtpSender {
    socket: Arc<UdpSocket>,
    dest: SocketAddr,
    stats: Arc<SenderStats>,
}

impl RtpSender {
    /// Builds a sender that transmits from the given receiver's own socket.
    pub fn shared(receiver: &RtpReceiver, dest: SocketAddr) -> Self {
        Self {
            socket: receiver.shared_socket(),
            dest,
            stats: Arc::new(SenderStats::default()),
        }
    }

    /// Binds its own socket as a fallback; less reliable across platforms
    /// than sharing the receiver's, per the shared-socket contract.
    pub async fn own_socket(host: &str, port: u16, dest: SocketAddr) -> Result<Self, Error> {
        let addr = format!("{host}:{port}");
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;

        Ok(Self {
            socket: Arc::new(socket),
            dest,
            stats: Arc::new(SenderStats::default()),
        })
    }

    pub fn stats(&self) -> Arc<SenderStats> {
        self.stats.clone()
    }

    pub async fn send(&self, packet: &RtpPacket) -> Result<(), Error> {
        let bytes = packet.to_bytes();
        self.socket
            .send_to(&bytes, self.dest)
            .await
            .map_err(Error::Send)?;

        self.stats.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_sent
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}
