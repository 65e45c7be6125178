//! soilmap CLI - soil map queries and the RRP lookup build.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "soilmap",
    version,
    about = "Soil classification lookups for map applications"
)]
struct Cli {
    #[command(subcommand)]
    command: soilmap_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    soilmap_cmd::run(cli.command).await
}
