pub mod classify;
pub mod config;
pub mod history;
pub mod init;
pub mod run;
pub mod scenarios;
pub mod serve;
pub mod stats;

use clap::Args;
use dialectic_core::event::{ErrorInfo, Event};

/// An event described on the command line.
#[derive(Args, Debug)]
pub struct EventArgs {
    /// Commit-style message describing the change
    #[arg(long, short = 'm', default_value = "")]
    pub message: String,

    /// Changed file (repeatable)
    #[arg(long = "file", short = 'f', value_name = "PATH")]
    pub files: Vec<String>,

    /// Reported error as TYPE or TYPE:COUNT (repeatable)
    #[arg(long = "error", short = 'e', value_name = "TYPE[:COUNT]")]
    pub errors: Vec<String>,
}

impl EventArgs {
    pub fn into_event(self) -> anyhow::Result<Event> {
        let errors = self
            .errors
            .iter()
            .map(|e| parse_error(e))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Event::new(self.message, self.files).with_errors(errors))
    }
}

fn parse_error(raw: &str) -> anyhow::Result<ErrorInfo> {
    let (kind, count) = match raw.rsplit_once(':') {
        Some((kind, count)) => {
            let count: u32 = count
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid error count in '{raw}'"))?;
            (kind, count)
        }
        None => (raw, 1),
    };
    if kind.is_empty() {
        anyhow::bail!("error type must not be empty: '{raw}'");
    }
    Ok(ErrorInfo {
        kind: kind.to_string(),
        count,
    })
}
