use audio_extract::config::Settings;
use audio_extract::{ConsoleReporter, ExtractError, Pipeline};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod tui;

use cli::{Cli, normalize_args, progress_wanted};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            // help and version land here with exit code 0
            let _ = err.print();
            return exit_with(err.exit_code());
        }
    };

    init_logging(cli.verbose);

    if cli.interactive {
        return match run_interactive() {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {err:#}");
                exit_with(2)
            }
        };
    }

    let show_progress = progress_wanted(cli.verbose);
    let request = match cli.into_request(show_progress) {
        Ok(request) => request,
        Err(err) => return fail(&err),
    };

    let result = Pipeline::default().run(request, &mut ConsoleReporter);
    match &result.error {
        None => ExitCode::SUCCESS,
        Some(err) => fail(err),
    }
}

fn run_interactive() -> anyhow::Result<ExitCode> {
    let mut settings = Settings::load();
    let request = tui::interactive_request(&settings)?;
    tui::remember(&mut settings, &request);
    if let Err(err) = settings.save() {
        warn!("could not save settings: {err}");
    }

    let result = Pipeline::default().run(request, &mut ConsoleReporter);
    debug!(success = result.success, exit_code = ?result.exit_code, "interactive run finished");
    Ok(match &result.error {
        None => ExitCode::SUCCESS,
        Some(err) => fail(err),
    })
}

fn fail(err: &ExtractError) -> ExitCode {
    eprintln!("error: {err}");
    exit_with(err.exit_code())
}

fn exit_with(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(2))
}
