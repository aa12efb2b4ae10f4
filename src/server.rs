//! Inbound HTTP front end: landing page, generate endpoint and metrics.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::ServeFile;

use crate::client::Gateway;
use crate::config::GatewayConfig;
use crate::error::Error;
use crate::metrics::{RequestCounter, EXPOSITION_CONTENT_TYPE};
use crate::request::PromptRequest;

/// Body of every failed generate call; detail stays in the log
pub const GENERATE_ERROR_BODY: &str = "Error getting AI SMS content";

/// Router for the public listener
pub fn app_router(gateway: Arc<Gateway>, index_path: &str) -> Router
{   Router::new()
      .route("/getAiSmsContent", get(get_ai_sms_content))
      .route_service("/", ServeFile::new(index_path))
      .with_state(gateway)
}

/// Router for the metrics listener
pub fn metrics_router(metrics: Arc<RequestCounter>) -> Router
{   Router::new()
      .route("/metrics", get(render_metrics))
      .with_state(metrics)
}

async fn get_ai_sms_content(
  State(gateway): State<Arc<Gateway>>
, query: Option<Query<PromptRequest>>
) -> Response
{   let request = query
      .map(|Query(request)| request)
      .unwrap_or_default();
    info!(
      "Received request for AI SMS content with prompt: {}",
      request.prompt
    );

    match gateway.generate(&request.prompt).await
    {   Ok(response) => (
          StatusCode::OK,
          [(CONTENT_TYPE, "application/json")],
          response.body
        ).into_response()
      , Err(e) => {
          error!("Error getting AI SMS content: {}", e);
          (StatusCode::INTERNAL_SERVER_ERROR, GENERATE_ERROR_BODY)
            .into_response()
        }
    }
}

async fn render_metrics(
  State(metrics): State<Arc<RequestCounter>>
) -> Response
{   (
      [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
      metrics.render()
    ).into_response()
}

/// Both listeners, bound and served together
pub struct Server
{   config: GatewayConfig
  , gateway: Arc<Gateway>
}

impl Server
{   pub fn new(
      config: GatewayConfig
    , metrics: Arc<RequestCounter>
    ) -> Self
    {   let gateway = Arc::new(Gateway::new(
          config.provider.clone(),
          metrics
        ));
        Server
        {   config
          , gateway
        }
    }

    /// Bind both listeners, then serve until Ctrl+C or SIGTERM.
    /// Either bind failing is an error before anything is served.
    pub async fn run(self) -> Result<(), Error>
    {   let metrics_listener = bind(self.config.metrics_addr).await?;
        info!(
          "Starting Prometheus metrics server on {}",
          self.config.metrics_addr
        );
        let listener = bind(self.config.listen_addr).await?;
        info!("Starting web server on {}", self.config.listen_addr);

        let app = app_router(
          Arc::clone(&self.gateway),
          &self.config.index_path
        );
        let metrics = metrics_router(
          Arc::clone(self.gateway.metrics())
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
          shutdown_signal().await;
          let _ = shutdown_tx.send(true);
        });

        let web = axum::serve(listener, app)
          .with_graceful_shutdown(wait_for(shutdown_rx.clone()))
          .into_future();
        let scrape = axum::serve(metrics_listener, metrics)
          .with_graceful_shutdown(wait_for(shutdown_rx))
          .into_future();

        tokio::try_join!(web, scrape).map_err(|e| {
          error!("Server error: {}", e);
          Error::Other(e.to_string())
        })?;

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, Error>
{   TcpListener::bind(addr).await.map_err(|e| {
      error!("Failed to bind {}: {}", addr, e);
      Error::Other(format!("failed to bind {}: {}", addr, e))
    })
}

async fn wait_for(mut rx: watch::Receiver<bool>)
{   // a dropped sender also ends the wait
    let _ = rx.wait_for(|stop| *stop).await;
}

async fn shutdown_signal()
{   let ctrl_c = async {
      if let Err(e) = tokio::signal::ctrl_c().await
      {   warn!("Failed to install Ctrl+C handler: {}", e);
          std::future::pending::<()>().await;
      }
    };

    #[cfg(unix)]
    let terminate = async {
      use tokio::signal::unix::{signal, SignalKind};
      match signal(SignalKind::terminate())
      {   Ok(mut sig) => {
            sig.recv().await;
          }
        , Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
          }
      }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select!
    { () = ctrl_c => info!("Received Ctrl+C, shutting down")
    , () = terminate => info!("Received SIGTERM, shutting down")
    }
}
