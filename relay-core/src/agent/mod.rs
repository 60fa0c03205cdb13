//! `agent` describes the external identity agent the relay delegates to
//!
//! The relay never performs `DID`, credential or proof cryptography itself. It only needs
//! the fields listed at [`types`], and the webhook events the agent emits, mapped into
//! correlator signals at [`event`]
pub mod event;
pub mod types;
