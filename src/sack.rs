//! The SACK processor: marks segments covered by incoming SACK blocks and
//! reports which unacknowledged segments should be retransmitted.
//!
//! SACK is advisory only — this module never removes a segment from the
//! queue. Only a cumulative ACK (see `window::SendWindow::ack_segment`)
//! retires segments.

use std::collections::VecDeque;

use bytes::Bytes;
use etherparse::TcpHeader;

use crate::seq::SeqNum;
use crate::segment::Segment;

/// A selective-ack block: `[left, right)`, `right` exclusive per spec.md
/// §4.6 — a segment whose `right_edge` equals `right` is *not* covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SackBlock {
    pub left: SeqNum,
    pub right: SeqNum,
}

/// Mark segments in `queue` covered by `blocks`, then report the
/// `(header, body)` of every segment still unmarked, in queue order.
///
/// Blocks with `right <= left`, or that fall outside `[snd_una, snd_nxt]`,
/// are silently ignored (spec.md §7) — they simply fail to sort into the
/// walk and match nothing.
pub fn handle_sack(
    queue: &mut VecDeque<Segment>,
    blocks: &[SackBlock],
    snd_una: SeqNum,
    snd_nxt: SeqNum,
) -> Vec<(TcpHeader, Bytes)> {
    let sorted = sanitize_and_sort(blocks, snd_una, snd_nxt);

    let mut si = 0usize;
    let mut bi = 0usize;

    while si < queue.len() && bi < sorted.len() {
        let block = sorted[bi];
        let seg = queue.get_mut(si).expect("si < queue.len()");

        if seg.left_edge().ge(block.right) {
            // This segment starts at or after the current block's right
            // edge: the block can't cover it or anything after it either,
            // since segments are ordered ascending by left edge. Advance
            // the block and re-check the same segment.
            bi += 1;
            continue;
        }

        if seg.left_edge().ge(block.left) && seg.right_edge().lt(block.right) {
            seg.set_sack(true);
        }

        si += 1;
    }

    queue
        .iter()
        .filter(|seg| !seg.sack())
        .map(|seg| (seg.header().clone(), seg.body().clone()))
        .collect()
}

fn sanitize_and_sort(blocks: &[SackBlock], snd_una: SeqNum, snd_nxt: SeqNum) -> Vec<SackBlock> {
    let mut valid: Vec<SackBlock> = blocks
        .iter()
        .copied()
        .filter(|b| b.left.lt(b.right))
        .filter(|b| b.left.in_closed_range(snd_una, snd_nxt) && b.right.in_closed_range(snd_una, snd_nxt))
        .collect();

    valid.sort_by_key(|b| b.left.wrapping_sub(snd_una));
    valid
}
