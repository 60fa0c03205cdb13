//! `workflow` implements the operations of the three parties of a credential exchange
//!
//! - `Issuer` registers itself as a trusted issuer, opens connections and offers credentials
//! - `Holder` manages its identity, accepts offers and answers presentation requests
//! - `Verifier` requests presentations and keeps the verified data
//!
//! Agent webhooks are handled here too, they end up as signals applied to the tracker
pub mod types;
pub mod usecase;

mod holder;
mod issuer;
mod verifier;
mod webhook;

#[cfg(test)]
mod fixtures;
