//! Inbound request and response types for the gateway

use serde::{Deserialize, Serialize};

/// Inbound prompt, read from the `prompt` query parameter.
/// A missing parameter is the empty prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest
{   #[serde(default)]
    pub prompt: String
}

/// Successful gateway result: the fetch call's body, untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse
{   /// HTTP status of the fetch call
    pub status: u16
  , /// Raw body bytes of the fetch call
    pub body: Vec<u8>
}

impl GatewayResponse
{   /// Body as text, lossy for logging
    pub fn body_text(&self) -> String
    {   String::from_utf8_lossy(&self.body).into_owned()
    }
}
