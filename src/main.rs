//! `silkcore` - headless actor and combat simulator

use clap::Parser;

use silkcore::cli::args::{Cli, OutputFormat};
use silkcore::cli::commands;
use silkcore::error::ExitCode;
use silkcore::observability::{LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();

    let format = match cli.log_format {
        OutputFormat::Human => LogFormat::Human,
        OutputFormat::Json => LogFormat::Json,
    };
    init_logging(format, cli.verbose, cli.quiet, cli.color);

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
