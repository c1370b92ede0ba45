//! Sequence-ordered RTP packet buffer with look-ahead skip for loss and a
//! depth cap rather than a latency cap.

use std::collections::BTreeMap;

use rtp_core::RtpPacket;

#[derive(Debug, Clone, Copy, Default)]
pub struct JitterBufferStats {
    pub packets_in: u64,
    pub packets_out: u64,
    pub packets_dropped: u64,
    pub current_size: usize,
    pub next_sequence: Option<u16>,
}

pub struct JitterBuffer {
    /// Buffer depth in milliseconds; kept for observability only, the
    /// eviction policy is purely count-based (see `max_packets`).
    buffer_time_ms: u64,
    max_packets: usize,
    skip_threshold: u16,

    buffer: BTreeMap<u16, RtpPacket>,
    next_sequence: Option<u16>,

    packets_in: u64,
    packets_out: u64,
    packets_dropped: u64,
}

impl Default for JitterBuffer {
    fn default() -> Self {
        Self::new(100, 50, 16)
    }
}

impl JitterBuffer {
    pub fn new(buffer_time_ms: u64, max_packets: usize, skip_threshold: u16) -> Self {
        Self {
            buffer_time_ms,
            max_packets,
            skip_threshold,
            buffer: BTreeMap::new(),
            next_sequence: None,
            packets_in: 0,
            packets_out: 0,
            packets_dropped: 0,
        }
    }

    pub fn put(&mut self, packet: RtpPacket) {
        self.packets_in += 1;

        let seq = packet.sequence_number;
        if self.next_sequence.is_none() {
            self.next_sequence = Some(seq);
        }
        self.buffer.insert(seq, packet);

        if self.buffer.len() > self.max_packets {
            self.force_output();
        }
    }

    pub fn get(&mut self) -> Option<RtpPacket> {
        let seq = self.next_sequence?;

        if let Some(packet) = self.buffer.remove(&seq) {
            self.next_sequence = Some(seq.wrapping_add(1));
            self.packets_out += 1;
            return Some(packet);
        }

        for i in 1..=self.skip_threshold {
            let check_seq = seq.wrapping_add(i);
            if let Some(packet) = self.buffer.remove(&check_seq) {
                tracing::debug!(skipped = i, "jitter buffer skipping lost packets");
                self.packets_dropped += i as u64;
                self.next_sequence = Some(check_seq.wrapping_add(1));
                self.packets_out += 1;
                return Some(packet);
            }
        }

        None
    }

    /// Last-resort recovery when the buffer has grown past `max_packets`:
    /// jump straight to the lowest buffered sequence number. This is a plain
    /// numeric minimum over `u16` keys, not a wraparound-aware one, matching
    /// the source this is ported from.
    fn force_output(&mut self) {
        let Some(&min_seq) = self.buffer.keys().next() else {
            return;
        };
        tracing::debug!(seq = min_seq, "jitter buffer overflow, resetting");
        self.next_sequence = Some(min_seq);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.next_sequence = None;
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_time_ms(&self) -> u64 {
        self.buffer_time_ms
    }

    pub fn stats(&self) -> JitterBufferStats {
        JitterBufferStats {
            packets_in: self.packets_in,
            packets_out: self.packets_out,
            packets_dropped: self.packets_dropped,
            current_size: self.buffer.len(),
            next_sequence: self.next_sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn packet(seq: u16) -> RtpPacket {
        RtpPacket::new(111, seq, seq as u32 * 960, 1, false, vec![])
    }

    #[test]
    fn first_packet_initializes_and_is_emitted_immediately() {
        let mut buf = JitterBuffer::default();
        buf.put(packet(5));
        let out = buf.get().expect("emits first packet");
        assert_eq!(out.sequence_number, 5);
    }

    #[test]
    fn in_order_packets_drain_in_order() {
        let mut buf = JitterBuffer::default();
        buf.put(packet(1));
        buf.put(packet(2));
        buf.put(packet(3));
        assert_eq!(buf.get().unwrap().sequence_number, 1);
        assert_eq!(buf.get().unwrap().sequence_number, 2);
        assert_eq!(buf.get().unwrap().sequence_number, 3);
    }

    #[test]
    fn skips_a_bounded_gap_and_counts_it_dropped() {
        let mut buf = JitterBuffer::new(100, 50, 16);
        buf.put(packet(10));
        buf.put(packet(13));
        let out = buf.get().expect("skip-ahead recovers");
        assert_eq!(out.sequence_number, 13);
        assert_eq!(buf.stats().packets_dropped, 3);
    }

    #[test]
    fn returns_none_when_nothing_within_skip_threshold() {
        let mut buf = JitterBuffer::new(100, 50, 4);
        buf.put(packet(1));
        buf.put(packet(10));
        assert!(buf.get().is_none());
    }

    #[test]
    fn never_emits_a_sequence_number_twice() {
        let mut buf = JitterBuffer::new(100, 50, 16);
        for seq in [1u16, 2, 4, 3, 5] {
            buf.put(packet(seq));
        }
        let mut seen = Vec::new();
        while let Some(p) = buf.get() {
            seen.push(p.sequence_number);
        }
        let mut dedup = seen.clone();
        dedup.dedup();
        assert_eq!(seen.len(), dedup.len());
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn forces_reset_to_minimum_sequence_when_over_capacity() {
        let mut buf = JitterBuffer::new(100, 2, 16);
        buf.put(packet(100));
        buf.put(packet(200));
        buf.put(packet(50));
        assert_eq!(buf.stats().next_sequence, Some(50));
    }
}
