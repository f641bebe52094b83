//! carehub server entry point.
//!
//! # Responsibility
//! - Load `CAREHUB_*` configuration and start logging.
//! - Run the HTTP server until a shutdown signal arrives.

use std::process::ExitCode;

use carehub_api::config::Config;
use carehub_core::{core_version, init_logging};
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("carehub: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("carehub: {err}");
        return ExitCode::FAILURE;
    }

    info!("event=cli_start module=cli status=ok version={}", core_version());
    for key in &config.defaults_used {
        info!("event=config_default module=cli key={key}");
    }

    match carehub_api::serve(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
