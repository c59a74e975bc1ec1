//! Evaluation-by-reference: one round trip, the service resolves the
//! snippet from its identifier.

use anyhow::Result;

use crate::config::Config;
use crate::playground::PlaygroundClient;
use crate::printer::OutcomePrinter;
use crate::runner::{resolve_outcome, ResolveMode, RunnerError, SubmitOptions};

pub async fn run(cfg: &Config, snippet: &str, color: bool) -> Result<bool> {
    let client = PlaygroundClient::from_config(cfg).map_err(RunnerError::from)?;
    let outcome = resolve_outcome(
        &client,
        ResolveMode::Reference,
        &SubmitOptions::default(),
        snippet,
    )
    .await?;

    OutcomePrinter { color }.print(&outcome);
    Ok(outcome.is_success())
}
