//! `exchange` tracks every in-flight credential exchange
//!
//! An exchange is keyed by the thread token assigned by the agent. Secondary tokens,
//! like a presentation id, can be linked to it as aliases. Reaching a terminal stage
//! triggers exactly one downstream notification
pub mod types;

mod record;
pub use record::ExchangeRecord;

mod tracker;
pub use tracker::Tracker;
