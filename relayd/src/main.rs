use clap::{Parser, Subcommand};
use rst_common::with_tokio::tokio;

use ssi_relayd::errors::RelayError;
use ssi_relayd::svc::rpc::Rpc;

#[derive(Parser)]
#[command(name = "ssi-relayd")]
#[command(version = "0.1")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "rpc")]
    #[command(about = "Running JSON-RPC and webhook server")]
    Rpc {
        #[arg(short, long, value_name = "FILE")]
        #[arg(required = true)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Rpc { config } => {
            let config = config
                .to_owned()
                .ok_or(RelayError::RpcError(String::from("missing config file")))?;

            let rpc_server = Rpc::new(config);
            rpc_server.serve().await?;
        }
    }

    Ok(())
}
