use clap::Parser;
use groundgen::cli::Cli;
use groundgen::logging::{init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::from_env()
    };
    let _guard = init_logging(logging)?;

    cli.run()
}
