mod client;
pub use client::HttpNotifier;
