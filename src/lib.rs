pub mod error;
pub mod config;
pub mod providers;
pub mod proxy;
pub mod request;
pub mod metrics;
pub mod client;
pub mod server;
pub mod logging;

/*

smsgate is a small HTTP gateway in front of a hosted inference API.
GET /getAiSmsContent?prompt=... creates a prediction job on the
provider, fetches the job once and hands the fetched body back.

smsgate/
├── Cargo.toml
├── index.html          # Landing page served on /
├── src/
│   ├── lib.rs          # Re-exports and overview
│   ├── main.rs         # Process entry: config, logging, listeners
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # Environment configuration, generation params
│   ├── proxy.rs        # HTTP_PROXY / HTTPS_PROXY resolution
│   ├── request.rs      # Inbound request / gateway response types
│   ├── providers/
│   │   ├── mod.rs
│   │   └── replicate.rs  # Submit + fetch against the provider
│   ├── client.rs       # Gateway orchestrator
│   ├── metrics.rs      # Request counter, Prometheus text format
│   ├── server.rs       # axum routers and listeners
│   └── logging.rs      # stdout + log file logger
└── tests/

*/

pub use client::{Gateway, GenerateStage};
pub use error::Error;
pub use metrics::RequestCounter;
pub use request::{GatewayResponse, PromptRequest};

/// Result of a generate call
pub type GenerateReply = Result<GatewayResponse, Error>;
