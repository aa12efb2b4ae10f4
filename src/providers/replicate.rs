use std::time::Instant;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error, info};
use url::Url;
use crate::config::{GenerationParams, ProviderConfig};
use crate::error::Error;
use crate::request::GatewayResponse;

// ===== Wire Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInput
{   pub top_k: u32
  , pub top_p: f64
  , pub prompt: String
  , pub temperature: f64
  , pub max_new_tokens: u32
  , pub prompt_template: String
  , pub presence_penalty: f64
  , pub frequency_penalty: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest
{   pub input: JobInput
}

impl JobRequest
{   /// Job body for a prompt; the prompt is carried verbatim
    pub fn new(prompt: &str, params: &GenerationParams) -> Self
    {   JobRequest
        {   input: JobInput
            {   top_k: params.top_k
              , top_p: params.top_p
              , prompt: prompt.to_string()
              , temperature: params.temperature
              , max_new_tokens: params.max_new_tokens
              , prompt_template: params.prompt_template.clone()
              , presence_penalty: params.presence_penalty
              , frequency_penalty: params.frequency_penalty
            }
        }
    }
}

/// Structured error body returned by the provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody
{   #[serde(default)]
    pub title: String
  , #[serde(default)]
    pub detail: String
  , #[serde(default)]
    pub status: u16
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobUrls
{   #[serde(default)]
    pub get: String
  , #[serde(default)]
    pub cancel: String
}

/// Locators returned by a successful submission
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobHandle
{   pub urls: JobUrls
}

impl JobHandle
{   pub fn fetch_url(&self) -> &str
    {   &self.urls.get
    }

    pub fn cancel_url(&self) -> &str
    {   &self.urls.cancel
    }
}

// ===== Replicate Client =====

/// Two-step client: create a prediction, then fetch it
pub struct ReplicateClient
{   config: ProviderConfig
  , http_client: reqwest::Client
}

impl ReplicateClient
{   /// Build a client routed through `proxy`, or direct when `None`.
    /// System proxy detection is off so only the caller decides.
    pub fn new(
      config: ProviderConfig
    , proxy: Option<&Url>
    ) -> Result<Self, Error>
    {   debug!("Creating ReplicateClient");
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(url) = proxy
        {   let proxy = reqwest::Proxy::all(url.as_str())
              .map_err(|e| {
                error!("Error configuring proxy: {}", e);
                Error::InvalidProxyUrl(url.to_string())
              })?;
            builder = builder.proxy(proxy);
        }
        let http_client = builder.build().map_err(|e| {
          error!("Error building HTTP client: {}", e);
          Error::TransportError(e.to_string())
        })?;

        Ok(ReplicateClient
        {   config
          , http_client
        })
    }

    fn authorization(&self) -> String
    {   format!("Bearer {}", self.config.api_token)
    }

    /// Create the prediction job. Anything but 201 is a `ProviderError`.
    pub async fn submit(&self, prompt: &str)
      -> Result<JobHandle, Error>
    {   let request
          = JobRequest::new(prompt, &self.config.generation);
        let body = serde_json::to_vec(&request).map_err(|e| {
          error!("Error marshaling request body: {}", e);
          Error::Other(e.to_string())
        })?;
        info!(
          "Calling AI service with request body: {}",
          String::from_utf8_lossy(&body)
        );

        let response = self.http_client
          .post(&self.config.predictions_url)
          .header("Authorization", self.authorization())
          .header("Content-Type", "application/json")
          .timeout(self.config.submit_timeout())
          .body(body)
          .send()
          .await
          .map_err(|e| {
            error!("Error calling AI service: {}", e);
            Error::from(e)
          })?;

        let status = response.status();
        trace!("Submit response status: {}", status);

        let bytes = response.bytes().await.map_err(|e| {
          error!("Error reading AI service response: {}", e);
          read_error(e)
        })?;
        let text = String::from_utf8_lossy(&bytes);
        info!("AI service response: {}", text);

        if status != reqwest::StatusCode::CREATED
        {   error!(
              "Error calling AI service: status code {}",
              status.as_u16()
            );
            return Err(provider_error(status.as_u16(), &bytes));
        }

        let handle: JobHandle = serde_json::from_slice(&bytes)
          .map_err(|e| {
            error!("Error decoding job handle: {}", e);
            Error::from(e)
          })?;
        info!("result AI URI: {}", handle.fetch_url());
        debug!("cancel AI URI: {}", handle.cancel_url());
        Ok(handle)
    }

    /// Fetch the job result. The body is returned as-is on 2xx.
    pub async fn fetch(&self, handle: &JobHandle)
      -> Result<GatewayResponse, Error>
    {   let start = Instant::now();
        let response = self.http_client
          .get(handle.fetch_url())
          .header("Authorization", self.authorization())
          .header("Content-Type", "application/json")
          .timeout(self.config.fetch_timeout())
          .send()
          .await
          .map_err(|e| {
            error!(
              "result Error calling AI service: {} (elapsed {:?})",
              e, start.elapsed()
            );
            Error::from(e)
          })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
          error!(
            "Error reading AI service response: {} (elapsed {:?})",
            e, start.elapsed()
          );
          read_error(e)
        })?;
        let elapsed = start.elapsed();
        info!(
          "result AI service response (elapsed {:?}): {}",
          elapsed, String::from_utf8_lossy(&body)
        );

        if !status.is_success()
        {   error!(
              "result AI service returned status code {}",
              status.as_u16()
            );
            return Err(Error::FetchFailed
            {   status: status.as_u16()
              , body: String::from_utf8_lossy(&body).into_owned()
            });
        }

        Ok(GatewayResponse
        {   status: status.as_u16()
          , body: body.to_vec()
        })
    }
}

fn read_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   Error::Timeout
    } else
    {   Error::ResponseReadError(e.to_string())
    }
}

/// Map a non-201 submit response to a terminal provider error
fn provider_error(status: u16, body: &[u8]) -> Error
{   match serde_json::from_slice::<ProviderErrorBody>(body)
    {   Ok(err) => {
          error!(
            "AI service error: {} ({}): {}",
            err.title, err.status, err.detail
          );
          Error::ProviderError
          {   title: err.title
            , detail: err.detail
            , status
          }
        }
      , Err(e) => {
          error!("Error unmarshaling AI service ERROR response: {}", e);
          Error::ProviderError
          {   title: "unexpected status".to_string()
            , detail: String::from_utf8_lossy(body).into_owned()
            , status
          }
        }
    }
}
