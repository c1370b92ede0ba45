use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// failed to bind udp socket at {addr}
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// failed to send rtp datagram
    Send(#[source] std::io::Error),
}
