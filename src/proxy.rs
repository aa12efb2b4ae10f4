//! Outbound proxy resolution from HTTP_PROXY / HTTPS_PROXY

use std::sync::Arc;
use log::{debug, error};
use url::Url;
use crate::error::Error;

/// Key lookup used to read proxy variables
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment
pub fn process_env() -> EnvLookup
{   Arc::new(|key: &str| std::env::var(key).ok())
}

/// Resolve the outbound proxy.
///
/// `HTTP_PROXY` wins, `HTTPS_PROXY` is the fallback; an empty value counts
/// as unset. A value that does not parse as an absolute URL with a host is
/// an error, never silently ignored.
pub fn resolve_proxy<F>(lookup: F) -> Result<Option<Url>, Error>
where F: Fn(&str) -> Option<String>
{   let raw = lookup("HTTP_PROXY")
      .filter(|v| !v.is_empty())
      .or_else(|| {
        lookup("HTTPS_PROXY").filter(|v| !v.is_empty())
      });

    let Some(raw) = raw else
    {   debug!("No proxy configured, connecting directly");
        return Ok(None);
    };

    let url = Url::parse(&raw).map_err(|e| {
      error!("Error parsing proxy URL: {}", e);
      Error::InvalidProxyUrl(raw.clone())
    })?;
    if !url.has_host()
    {   error!("Proxy URL has no host");
        return Err(Error::InvalidProxyUrl(raw));
    }

    debug!("Using proxy host: {:?}", url.host_str());
    Ok(Some(url))
}
