//! One function per CLI subcommand.
//!
//! Every command builds a JSON value and, unless `--json` was given, a
//! coloured text rendering of the same data.

mod config;
mod list;
mod review;
mod show;
mod stats;
mod trigger;
mod watch;

pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use list::cmd_list;
pub use review::{cmd_approve, cmd_reject};
pub use show::cmd_show;
pub use stats::cmd_stats;
pub use trigger::cmd_trigger;
pub use watch::{WatchCommand, WatchScreen, cmd_watch, run_watch};

use serde_json::Value;

use crate::cli::{FilterArgs, OutputOptions};
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{Filters, HttpGateway};

/// Loaded configuration plus a gateway pointed at the effective URL
pub struct Session {
    pub config: Config,
    pub gateway: HttpGateway,
}

impl Session {
    /// Load config; `api_url` wins over both the file and the environment
    pub fn open(api_url: Option<&str>) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        let url = match api_url {
            Some(_) => config.api_url.clone(),
            None => config.api_url(),
        };
        let gateway = HttpGateway::with_timeout(&url, config.request_timeout())?;
        Ok(Self { config, gateway })
    }
}

/// JSON result with an optional human rendering
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters {
            search: args.search.unwrap_or_default(),
            status: args.status.unwrap_or_default(),
            environment: args.environment.unwrap_or_default(),
            data_source_type: args.data_source_type.unwrap_or_default(),
        }
    }
}
