use rst_common::with_errors::thiserror::{self, Error};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("rpc error: {0}")]
    RpcError(String),

    #[error("teardown error: {0}")]
    TeardownError(String),
}
