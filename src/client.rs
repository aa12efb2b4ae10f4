use std::sync::Arc;
use log::{debug, error, info};
use crate::config::ProviderConfig;
use crate::error::Error;
use crate::metrics::RequestCounter;
use crate::providers::ReplicateClient;
use crate::proxy::{self, EnvLookup};
use crate::request::GatewayResponse;

/// Steps a single generate call moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStage
{   Idle
  , ProxyResolved
  , Submitted
  , Fetched
  , Done
}

/// Gateway orchestrator: proxy -> submit -> fetch.
///
/// Holds no per-request state, so one instance is shared by every
/// inbound request. The provider job is never cancelled; it expires on
/// the provider side.
pub struct Gateway
{   provider: ProviderConfig
  , metrics: Arc<RequestCounter>
  , env: EnvLookup
}

impl Gateway
{   /// Gateway reading proxy settings from the process environment
    pub fn new(
      provider: ProviderConfig
    , metrics: Arc<RequestCounter>
    ) -> Self
    {   Self::with_env(provider, metrics, proxy::process_env())
    }

    /// Gateway reading proxy settings through `env`
    pub fn with_env(
      provider: ProviderConfig
    , metrics: Arc<RequestCounter>
    , env: EnvLookup
    ) -> Self
    {   debug!("Creating Gateway for {}", provider.predictions_url);
        Gateway
        {   provider
          , metrics
          , env
        }
    }

    pub fn metrics(&self) -> &Arc<RequestCounter>
    {   &self.metrics
    }

    /// Run one generate call. Counts the request before anything can fail
    /// and stops at the first error.
    pub async fn generate(&self, prompt: &str)
      -> crate::GenerateReply
    {   self.metrics.increment();
        let mut stage = GenerateStage::Idle;

        let result = self.run(prompt, &mut stage).await;
        match &result
        {   Ok(_) => debug!("Generate finished at {:?}", stage)
          , Err(e) => error!("Generate failed after {:?}: {}", stage, e)
        }
        result
    }

    async fn run(&self, prompt: &str, stage: &mut GenerateStage)
      -> Result<GatewayResponse, Error>
    {   let proxy = proxy::resolve_proxy(|key| (*self.env)(key))?;
        let client = ReplicateClient::new(
          self.provider.clone(),
          proxy.as_ref()
        )?;
        *stage = GenerateStage::ProxyResolved;

        let handle = client.submit(prompt).await?;
        *stage = GenerateStage::Submitted;

        let response = client.fetch(&handle).await?;
        *stage = GenerateStage::Fetched;

        info!(
          "Generate completed with fetch status {}",
          response.status
        );
        *stage = GenerateStage::Done;
        Ok(response)
    }
}
