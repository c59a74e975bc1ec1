//! Fetch-only: print a snippet's raw source without evaluating it.

use anyhow::Result;

use crate::config::Config;
use crate::playground::{Evaluate, PlaygroundClient};
use crate::runner::RunnerError;

pub async fn run(cfg: &Config, snippet: &str) -> Result<bool> {
    let client = PlaygroundClient::from_config(cfg).map_err(RunnerError::from)?;
    let source = client.fetch_source(snippet).await.map_err(RunnerError::from)?;
    print!("{}", source);
    if !source.ends_with('\n') {
        println!();
    }
    Ok(true)
}
