use clap::Parser;
use common::{get_tcp_listener, init_logging};
use parking::app::Application;
use parking::config::{Cli, Command};
use parking::console::Console;
use std::io;

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, layout } => {
            let manager = layout.manager()?;
            let listener = get_tcp_listener(Some(port))?;
            Application::new(manager).run(listener)
        },
        Command::Console { layout } => {
            let manager = layout.manager()?;
            Console::new(manager, io::stdin().lock(), io::stdout()).run()?;
            Ok(())
        },
    }
}
