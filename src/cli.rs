use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "discovery")]
#[command(about = "Review discovered data sources")]
#[command(version)]
pub struct Cli {
    /// Discovery service base URL (overrides config and DISCOVERY_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format switch shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

impl OutputOptions {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

/// The four list filters as flags
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only records with this status (pending, approved, rejected)
    #[arg(long)]
    pub status: Option<String>,

    /// Only records from this environment
    #[arg(long)]
    pub environment: Option<String>,

    /// Only records of this data source type
    #[arg(long = "data-source-type", value_name = "TYPE")]
    pub data_source_type: Option<String>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of discoveries
    #[command(visible_alias = "ls")]
    List {
        /// Page number (0-based)
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Records per page (default: configured page_size)
        #[arg(long, value_parser = parse_page_size)]
        size: Option<u32>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one discovery in full
    #[command(visible_alias = "s")]
    Show {
        /// Discovery ID
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a discovery
    Approve {
        /// Discovery ID
        id: i64,

        /// Approver identity (default: configured user)
        #[arg(long)]
        by: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reject a discovery
    Reject {
        /// Discovery ID
        id: i64,

        /// Rejecter identity (default: configured user)
        #[arg(long)]
        by: Option<String>,

        /// Rejection reason (default: configured reject_reason)
        #[arg(long)]
        reason: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the service to start a discovery scan
    Trigger {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Live view with polling, new-record alerts and line commands on stdin
    #[command(visible_alias = "w")]
    Watch {
        /// Records per page (default: configured page_size)
        #[arg(long, value_parser = parse_page_size)]
        size: Option<u32>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, user, reject_reason, page_size, timings.*)
        key: String,
        /// Value to set
        value: String,
    },
    /// Print the config file path
    Path,
}

fn parse_page_size(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("Invalid page size '{s}'. Must be a positive integer")),
        Ok(n) => Ok(n),
    }
}
