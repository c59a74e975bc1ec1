use anyhow::{bail, Result};
use is_terminal::IsTerminal;

use ponyrun::cli;
use ponyrun::config::Config;
use ponyrun::handlers;
use ponyrun::printer::OutcomePrinter;
use ponyrun::runner::SubmitOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let cfg = Config::load();

    // CLI overrides config; config's "auto" falls back to TTY detection.
    let color = if args.no_color {
        false
    } else if args.color {
        true
    } else {
        match cfg.get("COLOR_OUTPUT").as_deref() {
            Some("always") => true,
            Some("never") => false,
            _ => std::io::stdout().is_terminal(),
        }
    };

    let opts = SubmitOptions {
        branch: args.branch.clone().unwrap_or_else(|| cfg.default_branch()),
        color,
        separate_output: if args.merged_output {
            false
        } else {
            cfg.get_bool("SEPARATE_OUTPUT")
        },
    };

    let ok = match route(&args, &cfg, &opts, color).await {
        Ok(ok) => ok,
        Err(err) => {
            // Classified failures get the same visible rendering as a
            // compile error; anything else propagates as usual.
            OutcomePrinter { color }.render_failure(err)?;
            false
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn route(args: &cli::Cli, cfg: &Config, opts: &SubmitOptions, color: bool) -> Result<bool> {
    if let Some(path) = &args.file {
        return handlers::submission::run_file(cfg, path, opts, color).await;
    }
    let Some(snippet) = args.snippet.as_deref() else {
        bail!("provide a snippet identifier (or --file <PATH>)");
    };
    if args.fetch_only {
        handlers::source::run(cfg, snippet).await
    } else if args.submit {
        handlers::submission::run(cfg, snippet, opts, color).await
    } else {
        handlers::reference::run(cfg, snippet, color).await
    }
}
