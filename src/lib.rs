//! Sender-side TCP transmission control: the bookkeeping of the remote
//! peer's receive window, the local retransmission queue, round-trip-time
//! measurement via the TCP Timestamp option, and processing of cumulative
//! and selective acknowledgements.
//!
//! This crate is the piece of a user-space TCP stack that decides *what
//! bytes are in flight, which to resend, and when an ACK has closed the
//! flight window*. It is a pure state machine: every public entry point is
//! `(&mut SendWindow, event) -> output`, with no I/O, no timers, and no
//! internal concurrency — see [`SendWindow`] for the four events it reacts
//! to.
//!
//! Explicitly out of scope, owned by collaborating crates instead: TCP
//! segment wire encoding/decoding (this crate borrows
//! [`etherparse::TcpHeader`] as its header value type but never parses wire
//! bytes itself), the receiver-side reassembly window, the connection state
//! machine (LISTEN/SYN-SENT/ESTABLISHED/...), retransmit timer scheduling
//! (this crate only reports "start RTO"), and congestion control (`cwnd`).

pub mod clock;
pub mod config;
pub mod sack;
pub mod segment;
pub mod seq;
pub mod window;

pub use clock::TimestampClock;
pub use config::{Config, ConfigError};
pub use sack::SackBlock;
pub use segment::Segment;
pub use seq::SeqNum;
pub use window::{AckOutcome, QueuedEmission, SendWindow};
