use anyhow::Result;
use clap::Parser;
use ledgerbook::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ledgerbook::init_tracing(cli.verbose);
    cli.run().await
}
