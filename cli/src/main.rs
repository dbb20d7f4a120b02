mod commands;
mod terminal;

use std::io::{self, Write};
use std::process::ExitCode;

use commands::{Action, CommandLine, inventory};
use edgeinv_core::pipeline::InventoryService;
use terminal::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    match run(&commands, io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(commands: &CommandLine, out: impl Write) -> anyhow::Result<()> {
    match commands.action() {
        Action::List => {
            let cfg = commands.config()?;
            info!("Discovering hosts on wired interfaces '{}*'", cfg.interface_prefix);
            inventory::list(&InventoryService::system(cfg), out, commands.pretty).await
        }
        Action::Host(name) => inventory::host(&name, out, commands.pretty),
        Action::Example => inventory::example(out, commands.pretty),
    }
}
