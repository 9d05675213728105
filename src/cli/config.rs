use anyhow::Result;
use console::style;

use crate::config::{Config, ResolvedValue, ValueOrigin};

fn origin_tag(resolved: &ResolvedValue) -> String {
    match resolved.origin {
        ValueOrigin::Env => format!("(env {})", resolved.env_var()),
        origin => format!("({})", origin.label()),
    }
}

/// Warns when an environment variable shadows the value just written.
fn note_env_override(config: &Config, key: &str) -> Result<()> {
    let resolved = config.effective(key)?;
    if resolved.origin == ValueOrigin::Env {
        println!(
            "  {} {} is set and takes precedence over the config file",
            style("note:").yellow(),
            style(resolved.env_var()).cyan()
        );
    }
    Ok(())
}

/// Print the effective value of one key. The API key is masked.
pub async fn handle_config_get(key: String) -> Result<()> {
    let resolved = Config::load()?.effective(&key)?;

    println!(
        "{} {}",
        resolved.display_value(),
        style(origin_tag(&resolved)).dim()
    );
    Ok(())
}

pub async fn handle_config_set(key: String, value: String) -> Result<()> {
    let mut config = Config::load()?;
    config.set(&key, value)?;
    config.save()?;

    println!(
        "{} {} saved to {}",
        style("✓").green(),
        style(&key).cyan(),
        style(Config::get_config_path()?.display()).dim()
    );
    note_env_override(&config, &key)
}

pub async fn handle_config_unset(key: String) -> Result<()> {
    let mut config = Config::load()?;
    config.unset(&key)?;
    config.save()?;

    let resolved = config.effective(&key)?;
    println!(
        "{} {} removed, now {} {}",
        style("✓").green(),
        style(&key).cyan(),
        resolved.display_value(),
        style(origin_tag(&resolved)).dim()
    );
    Ok(())
}

/// Print every key with its effective value and origin.
pub async fn handle_config_list() -> Result<()> {
    let config = Config::load()?;

    for resolved in config.effective_values() {
        println!(
            "  {:<9} {} {}",
            style(resolved.key).cyan(),
            resolved.display_value(),
            style(origin_tag(&resolved)).dim()
        );
    }

    let path = Config::get_config_path()?;
    let state = if path.exists() { "" } else { " (not created)" };
    println!();
    println!(
        "  Config file: {}{}",
        style(path.display()).dim(),
        style(state).dim()
    );

    Ok(())
}

pub async fn handle_config_path() -> Result<()> {
    println!("{}", Config::get_config_path()?.display());
    Ok(())
}
