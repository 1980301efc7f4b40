mod cli;
mod cmd;
mod error;
mod format;
mod io;
mod logging;
mod source;

use clap::Parser;

use crate::cli::{Cli, Command, PathOrStdin};
use crate::cmd::check::CheckOptions;
use crate::error::CliError;
use crate::format::FormatterConfig;
use crate::logging::Verbosity;
use crate::source::JsonSnapshotSource;

fn main() {
    let cli = Cli::parse();
    logging::init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet), cli.no_color);

    if let Err(e) = run(&cli) {
        // ChecksFailed is reported through the summary unless quiet.
        let already_reported = matches!(e, CliError::ChecksFailed { .. }) && !cli.quiet;
        if !already_reported {
            eprintln!("{}", e.message());
        }
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Check {
            catalog,
            snapshot,
            parallel,
        } => {
            if matches!(
                (catalog, snapshot),
                (PathOrStdin::Stdin, PathOrStdin::Stdin)
            ) {
                return Err(CliError::MultipleStdin);
            }
            let catalog_text = io::read_input(catalog, cli.max_file_size)?;
            let snapshot_text = io::read_input(snapshot, cli.max_file_size)?;
            let source = JsonSnapshotSource::parse(snapshot.to_string(), &snapshot_text)?;
            let options = CheckOptions {
                parallel: *parallel,
                format: cli.format,
                config: FormatterConfig::from_flags(cli.no_color, cli.quiet, cli.verbose),
            };
            cmd::check::run(&catalog_text, &source, &options, &mut out)
        }
        Command::Rules { catalog } => {
            let catalog_text = io::read_input(catalog, cli.max_file_size)?;
            cmd::rules::run(&catalog_text, cli.format, &mut out)
        }
        Command::Version => {
            use std::io::Write as _;
            writeln!(out, "{}", treeaudit_core::version()).map_err(|e| CliError::IoError {
                source: "stdout".to_owned(),
                detail: e.to_string(),
            })
        }
    }
}
