//! Cao - chat with any OpenAI-compatible or local model from the terminal.

use anyhow::Result;
use clap::Parser;

use cao::cli::{self, Cli};
use cao::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.debug);

    cli::execute(cli).await
}
