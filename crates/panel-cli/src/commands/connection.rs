use crate::context::AppContext;
use anyhow::{Context, Result};
use panel_core::GenerationBackend;

const PROBE_PROMPT: &str = "Hello, say connection successful!";
const PROBE_INSTRUCTIONS: &str = "You are a helpful assistant.";

pub async fn run(ctx: &AppContext) -> Result<()> {
    let config = ctx.load_config()?;
    let backend = ctx
        .backend(&config)
        .context("No LLM provider configured correctly")?;

    println!("Testing {}...", backend.name());
    let response = backend
        .generate(PROBE_PROMPT, PROBE_INSTRUCTIONS)
        .await
        .with_context(|| format!("Connection to {} failed", backend.name()))?;

    println!("{}", response.text.trim());
    if let Some(usage) = response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Connection test usage"
        );
    }

    Ok(())
}
