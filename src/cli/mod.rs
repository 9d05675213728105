pub mod ask;
pub mod config;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

#[derive(Parser)]
#[command(name = "groundgen")]
#[command(about = "Ask a generative-language model, with optional web search grounding")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt and print the answer with its sources
    Ask {
        /// User prompt
        prompt: String,
        /// System instruction sent alongside the prompt
        #[arg(short, long)]
        system: Option<String>,
        /// Ground the answer with web search results
        #[arg(long)]
        search: bool,
        /// Per-attempt timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key (api-key, model, base-url)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key (api-key, model, base-url)
        key: String,
        /// Value to store
        value: String,
    },
    /// Remove a config value
    Unset {
        /// Config key (api-key, model, base-url)
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let rt = Runtime::new()?;

        rt.block_on(async {
            match self.command {
                Commands::Ask {
                    prompt,
                    system,
                    search,
                    timeout,
                    json,
                } => ask::handle_ask_command(prompt, system, search, timeout, json).await,
                Commands::Config { command } => match command {
                    ConfigCommands::Get { key } => config::handle_config_get(key).await,
                    ConfigCommands::Set { key, value } => {
                        config::handle_config_set(key, value).await
                    }
                    ConfigCommands::Unset { key } => config::handle_config_unset(key).await,
                    ConfigCommands::List => config::handle_config_list().await,
                    ConfigCommands::Path => config::handle_config_path().await,
                },
            }
        })
    }
}
