//! Request counter exposed in the Prometheus text format

use std::sync::atomic::{AtomicU64, Ordering};

pub const REQUESTS_METRIC: &str = "ai_sms_requests_total";
const REQUESTS_HELP: &str = "Total number of AI SMS requests";

/// Content type of the Prometheus text exposition format
pub const EXPOSITION_CONTENT_TYPE: &str
  = "text/plain; version=0.0.4; charset=utf-8";

/// Counts generate requests received, successful or not
#[derive(Debug, Default)]
pub struct RequestCounter
{   total: AtomicU64
}

impl RequestCounter
{   pub fn new() -> Self
    {   RequestCounter::default()
    }

    pub fn increment(&self)
    {   self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64
    {   self.total.load(Ordering::Relaxed)
    }

    /// Render the counter for a `/metrics` scrape
    pub fn render(&self) -> String
    {   format!(
          "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n",
          name = REQUESTS_METRIC,
          help = REQUESTS_HELP,
          value = self.get()
        )
    }
}
