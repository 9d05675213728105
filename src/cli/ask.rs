use anyhow::Result;
use console::style;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::load_grounding_config;
use crate::services::google_ai::{GenerationError, GenerationRequest, GroundedClient};

/// Handle ask command
pub async fn handle_ask_command(
    prompt: String,
    system: Option<String>,
    search: bool,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = load_grounding_config(timeout.map(Duration::from_secs))?;
    let client = match GroundedClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!(
                "  Set {} or run {}",
                style(crate::env::apis::GEMINI_API_KEY).cyan(),
                style("groundgen config set api-key YOUR_KEY").cyan()
            );
            return Err(user_error(e));
        }
    };

    let mut request = GenerationRequest::new(prompt).with_search_grounding(search);
    if let Some(system) = system {
        request = request.with_system_prompt(system);
    }

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let result = client.generate_with_cancel(&request, &cancel).await;
    cancel.cancel();

    match result {
        Ok(result) if json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Ok(result) => {
            println!("{}", result.text);
            if !result.sources.is_empty() {
                println!();
                println!("{}", style("Sources:").bold());
                for (index, source) in result.sources.iter().enumerate() {
                    println!(
                        "  [{}] {} {}",
                        index + 1,
                        source.title,
                        style(&source.uri).dim()
                    );
                }
            }
            Ok(())
        }
        Err(e) => Err(user_error(e)),
    }
}

/// The error handed back to `main`, which prints it once. Upstream detail
/// only reaches the debug log.
fn user_error(error: GenerationError) -> anyhow::Error {
    tracing::debug!(kind = error.kind(), error = %error, "Generation failed");
    anyhow::anyhow!(error.user_message())
}
