//! docbrief CLI: chat with PDF documents and turn them into blog posts.
//!
//! Extracts text from local PDFs, answers questions about it with Gemini,
//! and runs the research → writer agent pipeline.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
