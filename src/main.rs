use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use provision_cli::cli::{self, Command, InstallOpts};
use provision_cli::commands;
use provision_cli::logging::{self, Console, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args
        .command
        .unwrap_or_else(|| Command::Install(InstallOpts::default()));

    let name = match &command {
        Command::Install(_) => "install",
        Command::List => "list",
        Command::Check(_) => "check",
        Command::Completions { shell } => {
            commands::completions::run(*shell);
            return Ok(());
        }
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
    };

    // `--json` owns stdout; progress and the summary move to stderr.
    let console = match &command {
        Command::Install(opts) if opts.json => Console::Stderr,
        _ => Console::Split,
    };
    logging::init_subscriber(args.verbose, name, console);
    let log = Arc::new(Logger::new(name));
    install_interrupt_handler(Arc::clone(&log))?;

    match command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::List => commands::list::run(&args.global, log.as_ref()),
        Command::Check(opts) => commands::check::run(&args.global, &opts, &log),
        Command::Completions { .. } | Command::Version => Ok(()),
    }
}

/// Exit with status 130 on Ctrl-C after telling the user a re-run is safe.
fn install_interrupt_handler(log: Arc<Logger>) -> Result<()> {
    ctrlc::set_handler(move || {
        log.warn("interrupted; every step is idempotent, so re-running provision is safe");
        std::process::exit(130);
    })?;
    Ok(())
}
