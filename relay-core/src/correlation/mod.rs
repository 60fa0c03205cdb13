//! `correlation` is the shared correlation store used by every party workflow
//!
//! It maps stable local keys into workflow state:
//!
//! - identity name to its current `DID` and the archived ones
//! - the trusted issuer set
//! - connection id (or exchange token) to the exchange hint
//! - opaque data id to the verified presentation data
//! - connection id to the registered connection record
//!
//! The store is constructed explicitly at startup and shared through an `Arc`
pub mod types;

mod identity;
pub use identity::IdentityRecord;

mod store;
pub use store::Store;
