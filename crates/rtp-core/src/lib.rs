//! RFC 3550 RTP packet parsing/serialization and the UDP transport that
//! carries it, including the shared-socket contract Janus plain-RTP
//! participants require.

mod error;
mod packet;
mod transport;

pub use error::Error;
pub use packet::RtpPacket;
pub use transport::{ReceiverStats, RtpReceiver, RtpSender, SenderStats};
