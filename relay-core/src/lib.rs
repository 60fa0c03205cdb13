//! `ssi-relay-core` is the domain layer of the credential exchange relay
//!
//! The actual `DID`, credential and proof operations are delegated to an external
//! identity agent, this crate only keeps the parties in sync:
//!
//! - [`correlation`] owns the shared store
//! - [`exchange`] tracks every in-flight exchange through its stages
//! - [`correlator`] matches inbound signals to the exchange they belong to
//! - [`agent`] describes the external agent and its webhook events
//! - [`workflow`] implements the `Issuer`, `Holder` and `Verifier` operations
pub mod agent;
pub mod correlation;
pub mod correlator;
pub mod exchange;
pub mod workflow;
