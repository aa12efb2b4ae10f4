//! Configuration for the gateway process and provider calls

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, error};
use crate::error::Error;

pub const DEFAULT_PREDICTIONS_URL: &str
  = "https://api.replicate.com/v1/models/mistralai/mixtral-8x7b-instruct-v0.1/predictions";

const DEFAULT_LISTEN_PORT: u16 = 8080;
const DEFAULT_METRICS_PORT: u16 = 8082;
const DEFAULT_INDEX_PATH: &str = "index.html";
const DEFAULT_LOG_FILE: &str = "ai_sms_service.log";
const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Fixed generation parameters sent with every job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams
{   pub top_k: u32
  , pub top_p: f64
  , pub temperature: f64
  , pub max_new_tokens: u32
  , pub prompt_template: String
  , pub presence_penalty: f64
  , pub frequency_penalty: f64
}

impl Default for GenerationParams
{   fn default() -> Self
    {   GenerationParams
        {   top_k: 50
          , top_p: 0.9
          , temperature: 0.6
          , max_new_tokens: 1024
          , prompt_template: "<s>[INST] {prompt} [/INST] ".to_string()
          , presence_penalty: 0.0
          , frequency_penalty: 0.0
        }
    }
}

/// Provider endpoint, credential and per-call timeouts
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Job-creation endpoint
    pub predictions_url: String
  , /// Bearer token, never logged
    #[serde(skip_serializing)]
    pub api_token: String
  , /// Timeout for the submit call in seconds
    pub submit_timeout_secs: u64
  , /// Timeout for the fetch call in seconds
    pub fetch_timeout_secs: u64
  , /// Generation parameters
    #[serde(default)]
    pub generation: GenerationParams
}

impl fmt::Debug for ProviderConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("ProviderConfig")
          .field("predictions_url", &self.predictions_url)
          .field("api_token", &"<redacted>")
          .field("submit_timeout_secs", &self.submit_timeout_secs)
          .field("fetch_timeout_secs", &self.fetch_timeout_secs)
          .field("generation", &self.generation)
          .finish()
    }
}

impl ProviderConfig
{   /// Config for a given endpoint with default timeouts
    pub fn new(
      predictions_url: impl Into<String>
    , api_token: impl Into<String>
    ) -> Self
    {   ProviderConfig
        {   predictions_url: predictions_url.into()
          , api_token: api_token.into()
          , submit_timeout_secs: DEFAULT_SUBMIT_TIMEOUT_SECS
          , fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS
          , generation: GenerationParams::default()
        }
    }

    pub fn submit_timeout(&self) -> Duration
    {   Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration
    {   Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Gateway process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig
{   /// Inbound listener address
    pub listen_addr: SocketAddr
  , /// Metrics listener address
    pub metrics_addr: SocketAddr
  , /// Landing page served on `/`
    pub index_path: String
  , /// Append-only log file
    pub log_file: String
  , /// Provider configuration
    pub provider: ProviderConfig
}

impl GatewayConfig
{   /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where F: Fn(&str) -> Option<String>
    {   let api_token = lookup("REPLICATE_API_TOKEN")
          .unwrap_or_default();
        if api_token.trim().is_empty()
        {   error!("REPLICATE_API_TOKEN is not set");
            return Err(Error::MissingApiToken);
        }

        let predictions_url = lookup("REPLICATE_PREDICTIONS_URL")
          .filter(|v| !v.is_empty())
          .unwrap_or_else(|| DEFAULT_PREDICTIONS_URL.to_string());
        url::Url::parse(&predictions_url).map_err(|e| {
          Error::InvalidConfiguration(
            format!("REPLICATE_PREDICTIONS_URL: {}", e)
          )
        })?;

        let mut provider
          = ProviderConfig::new(predictions_url, api_token);
        provider.submit_timeout_secs = parse_or(
          &lookup, "GATEWAY_SUBMIT_TIMEOUT_SECS",
          DEFAULT_SUBMIT_TIMEOUT_SECS
        )?;
        provider.fetch_timeout_secs = parse_or(
          &lookup, "GATEWAY_FETCH_TIMEOUT_SECS",
          DEFAULT_FETCH_TIMEOUT_SECS
        )?;
        if provider.submit_timeout_secs == 0
          || provider.fetch_timeout_secs == 0
        {   return Err(Error::InvalidConfiguration(
              "timeouts must be at least one second".to_string()
            ));
        }

        let config = GatewayConfig
        {   listen_addr: parse_or(
              &lookup, "GATEWAY_LISTEN_ADDR",
              SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT))
            )?
          , metrics_addr: parse_or(
              &lookup, "GATEWAY_METRICS_ADDR",
              SocketAddr::from(([0, 0, 0, 0], DEFAULT_METRICS_PORT))
            )?
          , index_path: lookup("GATEWAY_INDEX_PATH")
              .filter(|v| !v.is_empty())
              .unwrap_or_else(|| DEFAULT_INDEX_PATH.to_string())
          , log_file: lookup("GATEWAY_LOG_FILE")
              .filter(|v| !v.is_empty())
              .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
          , provider
        };
        debug!("Loaded gateway config: {:?}", config);
        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T)
  -> Result<T, Error>
where F: Fn(&str) -> Option<String>
    , T: std::str::FromStr
    , T::Err: std::fmt::Display
{   match lookup(key).filter(|v| !v.is_empty())
    {   None => Ok(default)
      , Some(raw) => raw.parse().map_err(|e| {
          error!("Invalid value for {}: {}", key, e);
          Error::InvalidConfiguration(format!("{}: {}", key, e))
        })
    }
}
