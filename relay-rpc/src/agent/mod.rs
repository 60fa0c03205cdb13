mod client;
pub use client::AgentClient;
