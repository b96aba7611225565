use clap::Parser;

use cxsheet::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli::init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    cli::run(cli).await
}
