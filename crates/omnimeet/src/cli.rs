use clap::{Parser, Subcommand};
use om_core::OutputFormat;

#[derive(Parser)]
#[command(name = "omnimeet")]
#[command(about = "Meeting transcript analysis: summarize, group by project, notify by role")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest one transcript: analyze, persist, and send notifications
    Ingest {
        /// Transcript file (.txt, .md or .vtt)
        path: String,

        /// Recipient directory CSV (overrides the configured path)
        #[arg(long)]
        recipients: Option<String>,

        /// Working directory (defaults to CWD)
        #[arg(long)]
        cd: Option<String>,
    },

    /// Extract the identity record from a transcript without side effects
    Extract {
        /// Transcript file (.txt, .md or .vtt)
        path: String,
    },

    /// Inspect stored projects
    Project {
        #[command(subcommand)]
        cmd: ProjectCommands,

        /// Working directory (defaults to CWD)
        #[arg(long)]
        cd: Option<String>,
    },

    /// Write a default omnimeet.toml into the project root
    Init {
        /// Working directory (defaults to CWD)
        #[arg(long)]
        cd: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Show one project's full rollup
    Show {
        /// Canonical project key
        key: String,
    },
    /// List known project keys and ids
    List,
}
