//! Logger writing to stdout and an append-only log file

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use env_logger::{Builder, Env, Target};
use crate::error::Error;

/// Copies every log line to stdout and to the log file
struct Tee
{   file: File
}

impl Write for Tee
{   fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {   self.file.write_all(buf)?;
        io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {   self.file.flush()?;
        io::stdout().flush()
    }
}

/// Open `path` for appending and install the global logger.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(path: &str) -> Result<(), Error>
{   let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .map_err(|e| {
        Error::InvalidConfiguration(
          format!("failed to open log file {}: {}", path, e)
        )
      })?;

    Builder::from_env(Env::default().default_filter_or("info"))
      .format_timestamp_micros()
      .target(Target::Pipe(Box::new(Tee { file })))
      .try_init()
      .map_err(|e| Error::Other(e.to_string()))
}
