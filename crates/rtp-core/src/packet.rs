use std::time::Instant;

use byteorder::{BigEndian, ByteOrder};

/// An RFC 3550 RTP packet, parsed from or destined for the wire.
#[derive(Debug, Clone)]
pub struct RtpPacket {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub csrc_count: u8,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub payload: Vec<u8>,
    pub received_at: Option<Instant>,
}

impl RtpPacket {
    /// Builds a new outbound packet. `received_at` is left unset; it is only
    /// meaningful for packets that arrived off a socket.
    pub fn new(
        payload_type: u8,
        sequence_number: u16,
        timestamp: u32,
        ssrc: u32,
        marker: bool,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            version: 2,
            padding: false,
            extension: false,
            csrc_count: 0,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            payload,
            received_at: None,
        }
    }

    /// Parses an RTP packet from raw bytes. Returns `None` on any malformed
    /// input rather than raising, parse failures are counted by the caller,
    /// not propagated as errors.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        let first_byte = data[0];
        let version = (first_byte >> 6) & 0x03;
        if version != 2 {
            return None;
        }
        let padding = (first_byte & 0x20) != 0;
        let extension = (first_byte & 0x10) != 0;
        let csrc_count = first_byte & 0x0F;

        let second_byte = data[1];
        let marker = (second_byte & 0x80) != 0;
        let payload_type = second_byte & 0x7F;

        let sequence_number = BigEndian::read_u16(&data[2..4]);
        let timestamp = BigEndian::read_u32(&data[4..8]);
        let ssrc = BigEndian::read_u32(&data[8..12]);

        let mut header_len = 12usize + 4 * csrc_count as usize;
        if data.len() < header_len {
            return None;
        }

        if extension && data.len() >= header_len + 4 {
            let ext_len = BigEndian::read_u16(&data[header_len + 2..header_len + 4]) as usize;
            header_len += 4 + 4 * ext_len;
        }

        if data.len() < header_len {
            return None;
        }

        let mut payload = data[header_len..].to_vec();

        if padding && !payload.is_empty() {
            let pad_len = *payload.last().unwrap() as usize;
            if pad_len == 0 || pad_len > payload.len() {
                return None;
            }
            payload.truncate(payload.len() - pad_len);
        }

        Some(Self {
            version,
            padding,
            extension,
            csrc_count,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            payload,
            received_at: None,
        })
    }

    /// Serializes the packet back to wire bytes. No CSRC list and no
    /// extension header are ever produced, matching the bridge's own sends.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.payload.len());

        let first_byte = (self.version << 6) | ((self.padding as u8) << 5) | (0 << 4) | 0;
        let second_byte = ((self.marker as u8) << 7) | (self.payload_type & 0x7F);

        out.push(first_byte);
        out.push(second_byte);

        let mut seq_buf = [0u8; 2];
        BigEndian::write_u16(&mut seq_buf, self.sequence_number);
        out.extend_from_slice(&seq_buf);

        let mut ts_buf = [0u8; 4];
        BigEndian::write_u32(&mut ts_buf, self.timestamp);
        out.extend_from_slice(&ts_buf);

        let mut ssrc_buf = [0u8; 4];
        BigEndian::write_u32(&mut ssrc_buf, self.ssrc);
        out.extend_from_slice(&ssrc_buf);

        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_a_simple_packet() {
        let packet = RtpPacket::new(111, 42, 960, 0x1234_5678, true, vec![1, 2, 3, 4]);
        let bytes = packet.to_bytes();
        let parsed = RtpPacket::parse(&bytes).expect("parses back");

        assert_eq!(parsed.version, 2);
        assert_eq!(parsed.marker, true);
        assert_eq!(parsed.payload_type, 111);
        assert_eq!(parsed.sequence_number, 42);
        assert_eq!(parsed.timestamp, 960);
        assert_eq!(parsed.ssrc, 0x1234_5678);
        assert_eq!(parsed.payload, vec![1, 2, 3, 4]);
    }

    #[test]
    fn rejects_non_version_2() {
        let mut bytes = RtpPacket::new(0, 0, 0, 0, false, vec![]).to_bytes();
        bytes[0] = (1 << 6) | (bytes[0] & 0x3F);
        assert!(RtpPacket::parse(&bytes).is_none());
    }

    #[test]
    fn rejects_short_buffers() {
        assert!(RtpPacket::parse(&[0u8; 4]).is_none());
    }

    #[test]
    fn strips_padding_when_present() {
        let mut bytes = RtpPacket::new(111, 1, 0, 1, false, vec![0xAA, 0xBB, 0x02]).to_bytes();
        bytes[0] |= 0x20; // set padding bit
        let parsed = RtpPacket::parse(&bytes).expect("parses");
        assert_eq!(parsed.payload, vec![0xAA]);
    }

    #[test]
    fn rejects_out_of_range_padding_count() {
        let mut bytes = RtpPacket::new(111, 1, 0, 1, false, vec![0xFF]).to_bytes();
        bytes[0] |= 0x20;
        assert!(RtpPacket::parse(&bytes).is_none());
    }

    #[test]
    fn parses_extension_header_and_skips_it() {
        let mut bytes = RtpPacket::new(111, 1, 0, 1, false, vec![]).to_bytes();
        bytes[0] |= 0x10; // extension bit
        bytes.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // profile, ext_len=1
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]); // one 32-bit ext word
        bytes.extend_from_slice(&[1, 2, 3]); // payload
        let parsed = RtpPacket::parse(&bytes).expect("parses");
        assert_eq!(parsed.payload, vec![1, 2, 3]);
    }
}
