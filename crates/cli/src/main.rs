use clap::Parser;

use molten_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    molten_observability::init(cli.log_format);

    molten_cli::run(cli).await
}
