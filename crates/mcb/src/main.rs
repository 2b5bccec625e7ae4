use clap::Parser;
use mcb::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mcb::run(cli).await?;
    Ok(())
}
