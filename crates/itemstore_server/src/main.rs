//! Server entry point.

use std::process::ExitCode;

use clap::Parser;
use itemstore_core::init_logging;
use itemstore_server::{serve, ServerConfig};
use log::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(err) = init_logging(config.log_level(), config.log_dir.as_deref()) {
        eprintln!("itemstore-server: {err}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_stop module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
