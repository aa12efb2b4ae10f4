use std::fmt;

/// Custom error type for gateway operations
/// Implements Clone so a failure can be logged and returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// HTTP_PROXY / HTTPS_PROXY held a value that is not a URL
    InvalidProxyUrl(String)
  , /// Connection level failure talking to the provider
    TransportError(String)
  , /// A per-call timeout elapsed
    Timeout
  , /// Response body could not be read
    ResponseReadError(String)
  , /// Response body was not the JSON we expected
    ResponseDecodeError(String)
  , /// Job submission was answered with something other than 201
    ProviderError
    {   title: String
      , detail: String
      , status: u16
    }
  , /// Result fetch was answered with a non-2xx status
    FetchFailed
    {   status: u16
      , body: String
    }
  , /// Provider API token is missing or empty
    MissingApiToken
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidProxyUrl(value) => {
              write!(f, "Invalid proxy URL: {}", value)
            }
          , Error::TransportError(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::ResponseReadError(msg) => {
              write!(f, "Failed to read response: {}", msg)
            }
          , Error::ResponseDecodeError(msg) => {
              write!(f, "Failed to decode response: {}", msg)
            }
          , Error::ProviderError { title, detail, status } => {
              write!(f,
                "Provider error ({}): {}: {}",
                status, title, detail
              )
            }
          , Error::FetchFailed { status, body } => {
              write!(f,
                "Result fetch failed ({}): {}",
                status, body
              )
            }
          , Error::MissingApiToken => {
              write!(f, "Provider API token is not configured")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Errors from sending a request; body reads are mapped separately
impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::TransportError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ResponseDecodeError(e.to_string())
    }
}
