//! HTTP surface for carehub.
//!
//! Every entity exposes the same REST contract under `/api/{collection}`:
//! create, read, full and partial update, delete and free-text search.
//! Writes land in the document store first and are then mirrored into the
//! search index; the two are not kept transactionally consistent.
//!
//! # Configuration
//! See [`config::Config`] for the `CAREHUB_*` environment variables.
//!
//! # Running
//! ```sh
//! CAREHUB_PORT=8080 CAREHUB_LOG_LEVEL=info cargo run -p carehub_cli
//! ```
//!
//! ```sh
//! curl -X POST localhost:8080/api/teams \
//!     -H 'content-type: application/json' \
//!     -d '{"name":"Cardiology"}'
//! curl 'localhost:8080/api/teams/_search?query=cardiology'
//! ```
use std::time::Duration;

use axum::{
    http::{
        header::{CONTENT_TYPE, LOCATION},
        Method,
    },
    Router,
};
use log::info;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod headers;
pub mod management;
pub mod resources;
pub mod state;

use config::Config;
use error::AppError;
use headers::{ALERT_HEADER, ERROR_HEADER, PARAMS_HEADER, TOTAL_COUNT_HEADER};
use management::management_routes;
use resources::api_routes;
use state::AppState;

/// Builds the full router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([
            LOCATION,
            ALERT_HEADER.clone(),
            ERROR_HEADER.clone(),
            PARAMS_HEADER.clone(),
            TOTAL_COUNT_HEADER.clone(),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(api_routes())
        .merge(management_routes())
        .layer(cors)
        .with_state(state)
}

/// Opens both databases, binds, and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config) -> Result<(), AppError> {
    info!(
        "event=server_init module=api status=start store={} index={}",
        config.store_path.display(),
        config.index_path.display()
    );
    let state = AppState::open(config)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_bind module=api status=ok address={address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("event=shutdown module=api signal=ctrl_c"),
            Err(err) => {
                log::error!("event=shutdown module=api status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=api signal=terminate");
            }
            Err(err) => {
                log::error!("event=shutdown module=api status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
