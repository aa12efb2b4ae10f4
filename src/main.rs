use std::process;
use std::sync::Arc;
use log::{error, info};
use smsgate::config::GatewayConfig;
use smsgate::metrics::RequestCounter;
use smsgate::server::Server;

#[tokio::main]
async fn main()
{   let config = match GatewayConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          eprintln!("Failed to load configuration: {}", e);
          process::exit(1);
        }
    };

    if let Err(e) = smsgate::logging::init(&config.log_file)
    {   eprintln!("Failed to set up logging: {}", e);
        process::exit(1);
    }
    info!("Logging to {}", config.log_file);

    let metrics = Arc::new(RequestCounter::new());
    if let Err(e) = Server::new(config, metrics).run().await
    {   error!("Gateway stopped: {}", e);
        process::exit(1);
    }
}
