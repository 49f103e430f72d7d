//! A single outstanding transmission sitting in the retransmit queue.

use bytes::Bytes;
use etherparse::{TcpHeader, TcpOptionElement};
use std::time::Instant;

use crate::seq::SeqNum;

/// One segment previously handed to the wire, still awaiting acknowledgment.
///
/// Immutable in shape: the only mutation this type exposes is
/// [`Segment::set_left_edge`], which trims a prefix already acknowledged by
/// a cumulative ACK landing inside the segment. `right_edge` never moves —
/// it's fixed the moment the segment is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    header: TcpHeader,
    right_edge: SeqNum,
    body: Bytes,
    /// Wall-clock send time; cleared on retransmit so the segment can never
    /// again yield an RTT sample (Karn's algorithm).
    sent_at: Option<Instant>,
    /// Set by the SACK processor, cleared by `retransmit_timeout`.
    sack: bool,
}

impl Segment {
    /// Build a segment starting at `header.sequence_number`, covering
    /// `body.len() + SYN? + FIN?` sequence numbers.
    pub fn new(header: TcpHeader, body: Bytes, sent_at: Option<Instant>) -> Self {
        let seq_len = sequence_length(&header, body.len());
        let right_edge = SeqNum(header.sequence_number).wrapping_add(seq_len);

        Segment {
            header,
            right_edge,
            body,
            sent_at,
            sack: false,
        }
    }

    pub fn header(&self) -> &TcpHeader {
        &self.header
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn left_edge(&self) -> SeqNum {
        SeqNum(self.header.sequence_number)
    }

    pub fn right_edge(&self) -> SeqNum {
        self.right_edge
    }

    pub fn sent_at(&self) -> Option<Instant> {
        self.sent_at
    }

    pub fn clear_sent_at(&mut self) {
        self.sent_at = None;
    }

    pub fn sack(&self) -> bool {
        self.sack
    }

    pub fn set_sack(&mut self, sack: bool) {
        self.sack = sack;
    }

    /// This segment's `(tsval, tsecr)` Timestamp option, if it carries one.
    pub fn timestamp_option(&self) -> Option<(u32, u32)> {
        timestamp_option(&self.header)
    }

    /// Advance this segment's left edge to `sn`, dropping the now-acked
    /// prefix. A no-op if `sn` doesn't actually move the left edge forward.
    ///
    /// `right_edge` is unchanged; a segment's sequence-number span only ever
    /// shrinks from the left as cumulative ACKs retire its bytes.
    pub fn set_left_edge(&mut self, sn: SeqNum) {
        let cur = self.left_edge();
        if !cur.lt(sn) {
            return;
        }

        let len = sn.wrapping_sub(cur);
        let drop_bytes = if self.header.syn {
            self.header.syn = false;
            len - 1
        } else {
            len
        };

        self.body = self.body.slice(drop_bytes as usize..);
        self.header.sequence_number = sn.0;
    }
}

/// Payload bytes plus one per SYN/FIN flag — the segment's footprint in
/// sequence-number space.
pub fn sequence_length(header: &TcpHeader, payload_len: usize) -> u32 {
    payload_len as u32 + header.syn as u32 + header.fin as u32
}

pub(crate) fn timestamp_option(header: &TcpHeader) -> Option<(u32, u32)> {
    header.options_iterator().find_map(|opt| match opt.ok()? {
        TcpOptionElement::Timestamp(tsval, tsecr) => Some((tsval, tsecr)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_at(seq: u32) -> TcpHeader {
        TcpHeader::new(1234, 80, seq, 4096)
    }

    #[test]
    fn right_edge_accounts_for_flags() {
        let mut h = header_at(1000);
        h.syn = true;
        let seg = Segment::new(h, Bytes::from_static(b"hello"), None);
        // 5 bytes + 1 for SYN
        assert_eq!(seg.right_edge(), SeqNum(1006));
    }

    #[test]
    fn trim_drops_prefix_and_advances_left_edge() {
        let h = header_at(1000);
        let mut seg = Segment::new(h, Bytes::from_static(b"0123456789"), None);

        seg.set_left_edge(SeqNum(1004));

        assert_eq!(seg.left_edge(), SeqNum(1004));
        assert_eq!(seg.right_edge(), SeqNum(1010)); // unchanged
        assert_eq!(seg.body().as_ref(), b"456789");
    }

    #[test]
    fn trim_through_syn_clears_flag_and_accounts_for_it() {
        let mut h = header_at(1000);
        h.syn = true;
        let mut seg = Segment::new(h, Bytes::from_static(b"0123456789"), None);

        // leftEdge 1000 carries the SYN; advancing to 1003 consumes the SYN
        // plus 2 bytes of body.
        seg.set_left_edge(SeqNum(1003));

        assert!(!seg.header().syn);
        assert_eq!(seg.left_edge(), SeqNum(1003));
        assert_eq!(seg.body().as_ref(), b"23456789");
    }

    #[test]
    fn trim_to_earlier_or_equal_edge_is_noop() {
        let h = header_at(1000);
        let mut seg = Segment::new(h, Bytes::from_static(b"0123456789"), None);

        seg.set_left_edge(SeqNum(1000));
        assert_eq!(seg.left_edge(), SeqNum(1000));
        assert_eq!(seg.body().len(), 10);

        seg.set_left_edge(SeqNum(900));
        assert_eq!(seg.left_edge(), SeqNum(1000));
    }

    #[test]
    fn reads_timestamp_option() {
        let mut h = header_at(1000);
        h.set_options(&[TcpOptionElement::Timestamp(42, 7)]).unwrap();
        let seg = Segment::new(h, Bytes::new(), None);

        assert_eq!(seg.timestamp_option(), Some((42, 7)));
    }
}
