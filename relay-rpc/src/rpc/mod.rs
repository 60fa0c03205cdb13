mod shared;
pub use shared::db::Bucket as DbBucket;
pub use shared::db::Builder as DbBuilder;
pub use shared::db::DbError;
pub use shared::rpc::method::{build_rpc_method, RpcMethodBuilder, RPC_METHOD_PREFIX};
pub use shared::types::RPCService;

pub mod exchange;
pub mod store;
pub mod workflow;

mod manager;
pub use manager::Manager;

use ssi_relay_core::correlation::Store;
use ssi_relay_core::workflow::usecase::Usecase;

use crate::agent::AgentClient;
use crate::notification::HttpNotifier;

pub type RelayStore = Store<store::Repository>;
pub type RelayUsecase = Usecase<store::Repository, HttpNotifier, AgentClient>;
