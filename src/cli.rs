use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "ponyrun", about = "Run Pony documentation snippets on the Pony Playground", version)]
#[command(group(ArgGroup::new("mode").args(["submit", "file", "fetch_only"]).multiple(false)))]
#[command(group(ArgGroup::new("color_switch").args(["color", "no_color"]).multiple(false)))]
pub struct Cli {
    /// Snippet identifier, e.g. "hello-world-main.pony".
    #[arg(value_name = "SNIPPET")]
    pub snippet: Option<String>,

    /// Fetch the snippet's raw source first, then submit it for
    /// evaluation (two round trips) instead of evaluating by reference.
    #[arg(long)]
    pub submit: bool,

    /// Evaluate a local file's contents by submission.
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Print the snippet's raw source without evaluating it.
    #[arg(long = "fetch-only")]
    pub fetch_only: bool,

    /// Compiler branch/version label for submissions.
    #[arg(long)]
    pub branch: Option<String>,

    /// Force ANSI color in playground output.
    #[arg(long)]
    pub color: bool,
    /// Disable ANSI color.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Interleave compiler diagnostics with program output instead of
    /// separating them.
    #[arg(long = "merged-output")]
    pub merged_output: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
