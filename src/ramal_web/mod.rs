use std::fmt::Display;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tokio::net::ToSocketAddrs;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::ramal::forecast::ForecastUrl;
use crate::ramal::resolve::Resolver;

mod handlers;

pub struct Options<A> {
    pub resolver: Resolver,
    pub forecast_url: ForecastUrl,
    pub addr: A,
}

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub forecast_url: ForecastUrl,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/region", get(handlers::api::handle_region_get))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

pub async fn serve<A>(opts: Options<A>) -> Result<()>
where
    A: ToSocketAddrs + Display,
{
    let state = AppState {
        resolver: opts.resolver,
        forecast_url: opts.forecast_url,
    };

    let app = router(state);

    info!("Starting webserver on http://{}/", opts.addr);
    let listener = tokio::net::TcpListener::bind(opts.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down webserver");
}
