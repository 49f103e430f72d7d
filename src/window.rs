//! The Send Window: the ordered retransmit queue plus `SND.NXT`, `SND.WND`,
//! `SND.AVAIL`, and the four event entry points that mutate them.
//!
//! ```text
//!                 RFC 9293 - S3.3.1 - Fig 3
//!
//!            1         2          3          4
//!       ----------|----------|----------|----------
//!              SND.UNA    SND.NXT    SND.UNA
//!                                   +SND.WND
//!
//! 1 - old sequence numbers that have been acknowledged
//! 2 - sequence numbers of unacknowledged data
//! 3 - sequence numbers allowed for new data transmission
//! 4 - future sequence numbers that are not yet allowed
//! ```
//!
//! A `SendWindow` is owned by exactly one connection; the enclosing stack
//! serializes all events presented to it (spec.md §5) — this type performs
//! no locking of its own.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bytes::Bytes;
use etherparse::TcpHeader;

use crate::clock::TimestampClock;
use crate::config::Config;
use crate::sack::{self, SackBlock};
use crate::seq::SeqNum;
use crate::segment::{sequence_length, Segment};

/// What `queue_segment` hands back to the caller to send on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEmission {
    /// True iff the retransmit queue was empty before this segment was
    /// appended — the signal the enclosing stack uses to start the RTO
    /// timer (the core never schedules timers itself).
    pub start_retransmit_timer: bool,
    pub header: TcpHeader,
    pub body: Bytes,
}

/// What `ack_segment` hands back for an in-window cumulative ACK.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AckOutcome {
    pub queue_now_empty: bool,
    pub rtt_sample: Option<Duration>,
}

/// The sender-side transmission control state for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct SendWindow {
    retransmit_queue: VecDeque<Segment>,
    snd_nxt: SeqNum,
    snd_wnd: u32,
    /// Signed: a shrinking peer window can drive this transiently negative
    /// (spec.md §4.7); callers must not treat it as a byte count until it's
    /// back at or above zero.
    snd_avail: i64,
    ts_clock: TimestampClock,
}

impl SendWindow {
    /// `emptyWindow`: construct a window with no outstanding segments.
    pub fn new(snd_nxt: SeqNum, snd_wnd: u32, ts_clock: TimestampClock) -> Self {
        SendWindow {
            retransmit_queue: VecDeque::new(),
            snd_nxt,
            snd_wnd,
            snd_avail: snd_wnd as i64,
            ts_clock,
        }
    }

    pub fn snd_nxt(&self) -> SeqNum {
        self.snd_nxt
    }

    /// The left edge of the oldest unacknowledged segment, or `snd_nxt` if
    /// the queue is empty.
    pub fn snd_una(&self) -> SeqNum {
        self.retransmit_queue
            .front()
            .map(Segment::left_edge)
            .unwrap_or(self.snd_nxt)
    }

    pub fn snd_wnd(&self) -> u32 {
        self.snd_wnd
    }

    pub fn snd_avail(&self) -> i64 {
        self.snd_avail
    }

    /// `nullWindow`: true iff there is nothing outstanding.
    pub fn is_null(&self) -> bool {
        self.retransmit_queue.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn retransmit_queue(&self) -> &VecDeque<Segment> {
        &self.retransmit_queue
    }

    /// `setSndNxt`: succeeds only when the queue is empty (handshake/reset
    /// use only). Returns whether the assignment happened.
    pub fn set_snd_nxt(&mut self, n: SeqNum) -> bool {
        if !self.is_null() {
            return false;
        }
        self.snd_nxt = n;
        true
    }

    /// Apply a new advertised window, adjusting `snd_avail` by the delta.
    pub fn update_snd_wnd(&mut self, new_wnd: u32) {
        let delta = new_wnd as i64 - self.snd_wnd as i64;
        self.snd_avail += delta;
        self.snd_wnd = new_wnd;

        log::trace!(
            "snd_wnd {} -> {new_wnd} (snd_avail now {})",
            self.snd_wnd,
            self.snd_avail
        );
    }

    /// `flushWindow`: empty the queue, leaving scalars intact. Used on
    /// connection abort.
    pub fn flush(&mut self) {
        self.retransmit_queue.clear();
    }

    /// §4.3 `queueSegment`.
    ///
    /// `build_header` is invoked with the freshly-advanced timestamp value
    /// and the current `SND.NXT`, and returns the header to emit — the
    /// caller (the codec/collaborator layer) owns filling in the Timestamp
    /// option's echoed value, ports, and any other flags.
    pub fn queue_segment(
        &mut self,
        cfg: &Config,
        now: Instant,
        build_header: impl FnOnce(u32, u32) -> TcpHeader,
        payload: Bytes,
    ) -> Option<QueuedEmission> {
        self.ts_clock.update(cfg, now);
        let ts_val = self.ts_clock.value();

        let header = build_header(ts_val, self.snd_nxt.0);

        if sequence_length(&header, payload.len()) == 0 {
            // Pure control segment (e.g. a bare ACK): pass it through
            // without touching the queue or window.
            return Some(QueuedEmission {
                start_retransmit_timer: false,
                header,
                body: Bytes::new(),
            });
        }

        if self.snd_avail <= 0 {
            log::trace!("queue_segment blocked: snd_avail={}", self.snd_avail);
            return None;
        }

        let take = (self.snd_avail as usize).min(payload.len());
        let trimmed_body = payload.slice(0..take);

        let was_empty = self.retransmit_queue.is_empty();

        let segment = Segment::new(header.clone(), trimmed_body.clone(), Some(now));
        let seq_len = segment.right_edge().wrapping_sub(SeqNum(header.sequence_number));

        self.snd_avail -= seq_len as i64;
        self.snd_nxt = self.snd_nxt.wrapping_add(seq_len);
        self.retransmit_queue.push_back(segment);

        log::trace!(
            "queued segment seq={} len={seq_len} snd_nxt={}",
            header.sequence_number,
            self.snd_nxt
        );

        Some(QueuedEmission {
            start_retransmit_timer: was_empty,
            header,
            body: trimmed_body,
        })
    }

    /// §4.4 `ackSegment`: process a cumulative ACK.
    ///
    /// Returns `None` if `ack` is out of window — the window is left
    /// completely untouched in that case, per spec.md §7.
    pub fn ack_segment(&mut self, cfg: &Config, now: Instant, ack: SeqNum) -> Option<AckOutcome> {
        let una_before = self.snd_una();

        if !ack.in_closed_range(una_before, self.snd_nxt) {
            return None;
        }

        let mut acked: Vec<Segment> = Vec::new();

        while let Some(front) = self.retransmit_queue.front() {
            if front.right_edge().le(ack) {
                acked.push(self.retransmit_queue.pop_front().expect("front just peeked"));
            } else if front.left_edge().le(ack) {
                self.retransmit_queue
                    .front_mut()
                    .expect("front just peeked")
                    .set_left_edge(ack);
                break;
            } else {
                break;
            }
        }

        self.snd_avail += ack.wrapping_sub(una_before) as i64;
        self.ts_clock.update(cfg, now);

        let rtt_sample = self.compute_rtt_sample(cfg, now, &acked);
        let queue_now_empty = self.retransmit_queue.is_empty();

        log::debug!(
            "ack_segment ack={ack} acked_segments={} queue_now_empty={queue_now_empty} rtt={:?}",
            acked.len(),
            rtt_sample
        );

        Some(AckOutcome {
            queue_now_empty,
            rtt_sample,
        })
    }

    /// Prefer the Timestamp-echo sample from the most recently acked
    /// segment (the one with the highest `right_edge`); fall back to the
    /// oldest acked segment whose `sent_at` survived (i.e. was never
    /// retransmitted), per Karn's algorithm.
    fn compute_rtt_sample(&self, cfg: &Config, now: Instant, acked: &[Segment]) -> Option<Duration> {
        let most_recent = acked.last()?;

        // `sent_at` is cleared by `retransmit_timeout` the moment a segment
        // is resent, so `is_some()` here doubles as "never retransmitted."
        // Gating the Timestamp-echo branch on it too keeps a stale `tsval`
        // left over from the original send from ever producing a sample for
        // a segment that was actually retransmitted.
        if most_recent.sent_at().is_some() {
            // The segment's own `tsval` is what we stamped it with at send
            // time; if the peer echoes correctly, that's exactly the value
            // their ACK's TSecr carries, so `clock.value - tsval` is the RTT
            // without needing the incoming ACK's header threaded through here.
            if let Some((tsval, _tsecr)) = most_recent.timestamp_option() {
                return Some(self.ts_clock.measure_rtt(cfg, tsval));
            }
        }

        acked
            .iter()
            .find_map(|seg| seg.sent_at().map(|sent| now.duration_since(sent)))
    }

    /// §4.5 `retransmitTimeout`.
    ///
    /// The clock is deliberately *not* advanced here: doing so would skew
    /// RTT samples taken from segments acked shortly afterward.
    pub fn retransmit_timeout(&mut self) -> Option<(TcpHeader, Bytes)> {
        let head = self.retransmit_queue.front()?;
        let emission = (head.header().clone(), head.body().clone());

        for seg in self.retransmit_queue.iter_mut() {
            seg.set_sack(false);
        }
        self.retransmit_queue
            .front_mut()
            .expect("queue non-empty, checked above")
            .clear_sent_at();

        log::debug!("retransmit_timeout resending seq={}", emission.0.sequence_number);

        Some(emission)
    }

    /// §4.6 `handleSack`.
    pub fn handle_sack(&mut self, blocks: &[SackBlock]) -> Vec<(TcpHeader, Bytes)> {
        sack::handle_sack(&mut self.retransmit_queue, blocks, self.snd_una(), self.snd_nxt)
    }
}
