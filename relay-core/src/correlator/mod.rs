//! `correlator` matches inbound signals, webhook payloads or poll responses, to the
//! pending exchange token they concern
//!
//! When a signal only carries a thread id the correlator scans a [`types::CandidateSource`]
//! with a bounded exponential backoff, since the agent may list the record a bit later
//! than it emitted the thread id
pub mod types;

mod correlator;
pub use correlator::Correlator;
