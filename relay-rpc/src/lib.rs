//! `ssi-relay-rpc` wires the relay domain to its runtime adapters
//!
//! It owns the TOML configuration, the RocksDB backed store repository, the HTTP clients
//! used to reach the identity agents and the notification intakes, and the JSON-RPC
//! processor exposing every operation.
use std::sync::Arc;

use prople_jsonrpc_core::objects::RpcProcessor;

use rst_common::with_logging::log::info;

use ssi_relay_core::correlation::Store;
use ssi_relay_core::exchange::Tracker;
use ssi_relay_core::workflow::types::WorkflowSettings;
use ssi_relay_core::workflow::usecase::{Agents, Usecase};

pub mod agent;
pub mod common;
pub mod config;
pub mod notification;
pub mod rpc;

use agent::AgentClient;
use common::helpers;
use common::types::CommonError;
use config::{App, Config, Parser as ConfigManager};
use notification::HttpNotifier;
use rpc::store::Repository;
use rpc::{DbBuilder, Manager, RelayStore, RelayUsecase};

/// `RelayRPC` builds every runtime component from a single configuration file
pub struct RelayRPC {
    config: Config,
    usecase: Option<RelayUsecase>,
}

impl RelayRPC {
    pub fn new(conf_file: &str) -> Result<Self, CommonError> {
        let config = ConfigManager::new(conf_file.to_string())
            .parse()
            .map_err(|err| CommonError::ConfigError(err.to_string()))?;

        helpers::validate(config.clone())?;
        Ok(Self {
            config,
            usecase: None,
        })
    }

    pub fn build_app_config(&self) -> Result<App, CommonError> {
        Ok(self.config.app().clone())
    }

    /// `build` opens the storage and restores the persisted records before any
    /// request gets served
    pub async fn build(&mut self) -> Result<&mut Self, CommonError> {
        let db_executor = DbBuilder::new(self.config.db().relay.clone()).build()?;

        let correlation = self.config.correlation();
        let store = Store::init(Repository::new(db_executor), correlation.get_policy())
            .await
            .map_err(|err| CommonError::DbError(err.to_string()))?;

        let agent = self.config.agent();
        let notifier = HttpNotifier::new(self.config.notification().clone(), agent.get_timeout())?;
        let tracker = Tracker::new(notifier);

        let (issuer_url, holder_url, verifier_url) = agent.get_urls();
        let registry_url = agent.get_definition_registry_url();
        let agents = Agents::new(
            AgentClient::new(issuer_url, registry_url.clone(), agent.get_timeout())?,
            AgentClient::new(holder_url, registry_url.clone(), agent.get_timeout())?,
            AgentClient::new(verifier_url, registry_url, agent.get_timeout())?,
        );

        let settings = WorkflowSettings {
            agent_timeout: agent.get_timeout(),
            retry: correlation.get_retry_policy(),
            ..WorkflowSettings::default()
        };

        self.usecase = Some(Usecase::new(
            Arc::new(store),
            Arc::new(tracker),
            Arc::new(agents),
            settings,
        ));

        info!("[relay:build] runtime components ready");
        Ok(self)
    }

    pub fn usecase(&self) -> Result<RelayUsecase, CommonError> {
        self.usecase
            .clone()
            .ok_or(CommonError::InternalError(String::from(
                "relay components are not built yet",
            )))
    }

    pub fn store(&self) -> Result<Arc<RelayStore>, CommonError> {
        self.usecase().map(|usecase| usecase.store())
    }

    /// `processor` registers the store, exchange and workflow services into one processor
    pub fn processor(&self) -> Result<RpcProcessor, CommonError> {
        let usecase = self.usecase()?;

        let mut manager = Manager::new();
        manager
            .build_store_service(usecase.store())?
            .build_exchange_service(usecase.tracker())?
            .build_workflow_service(usecase)?;

        Ok(manager.processor())
    }
}
