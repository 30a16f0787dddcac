use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kisan-chat", version, about = "Ask the Kisan farm assistant from the terminal")]
pub struct Cli {
    /// Agent backend base URL (overrides config)
    #[arg(long, env = "KISAN_AGENT_URL", global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream an answer as it is generated
    Ask {
        #[arg(required = true)]
        question: Vec<String>,

        /// Print every event as a JSON line instead of the answer text
        #[arg(long)]
        raw: bool,

        /// Give up after this many seconds
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// Fetch the whole answer in one request
    Complete {
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Check that the backend is reachable
    Health,
}
