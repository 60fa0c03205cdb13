pub mod rpc;
mod webhook;
