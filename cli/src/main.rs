mod commands;
mod terminal;

use commands::{CommandLine, Commands, probe, serve};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);

    match commands.command.unwrap_or_default() {
        Commands::Serve(args) => serve::serve(args.into_config()).await,
        Commands::Probe {
            target,
            timeout_ms,
            path,
        } => probe::probe(target, timeout_ms, path).await,
    }
}
