//! Evaluation-by-submission: fetch raw source (or read a local file),
//! then POST it to the evaluation endpoint.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::playground::{EvalRequest, Evaluate, PlaygroundClient};
use crate::printer::OutcomePrinter;
use crate::runner::{resolve_outcome, ResolveMode, RunnerError, SubmitOptions};

pub async fn run(cfg: &Config, snippet: &str, opts: &SubmitOptions, color: bool) -> Result<bool> {
    let client = PlaygroundClient::from_config(cfg).map_err(RunnerError::from)?;
    let outcome = resolve_outcome(&client, ResolveMode::Submission, opts, snippet).await?;

    OutcomePrinter { color }.print(&outcome);
    Ok(outcome.is_success())
}

pub async fn run_file(cfg: &Config, path: &str, opts: &SubmitOptions, color: bool) -> Result<bool> {
    let code = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path))?;

    let client = PlaygroundClient::from_config(cfg).map_err(RunnerError::from)?;
    let req = EvalRequest {
        code,
        separate_output: opts.separate_output,
        color: opts.color,
        branch: opts.branch.clone(),
    };
    let outcome = client.evaluate_code(&req).await.map_err(RunnerError::from)?;

    OutcomePrinter { color }.print(&outcome);
    Ok(outcome.is_success())
}
