use clap::Parser;
use clipper_bookmarks_lib::{init_tracing_subscriber, resolve_config, run_command, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config)?;

    init_tracing_subscriber(config.logging.dir.as_deref())?;

    run_command(config, cli.command.unwrap_or_default()).await
}
