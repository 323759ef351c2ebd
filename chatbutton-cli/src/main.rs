use std::{path::PathBuf, process::ExitCode};

use chatbutton_lib::{Error, Result, Site, config::CoreConfig, settings::Settings, store};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod check;
mod submit;

#[derive(Parser, Debug)]
#[command(name = "chatbutton")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use this configuration file instead of the default one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Store the default settings if none exist yet
    Activate,
    /// Print the effective settings
    Show,
    /// Submit one tab of the settings page
    Submit(submit::Args),
    /// Decide whether the button is shown on a page
    Check(check::Args),
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{} {err}", "warning:".yellow().bold());
    }

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => sysexits::ExitCode::Ok.into(),
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err).into()
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => CoreConfig::default_path()?,
    };
    let cfg = CoreConfig::load(&config_path)?;
    let site = Site::new(cfg.store()?, cfg.clock());

    match &cli.command {
        Command::Activate => print_settings(&site.activate()?),
        Command::Show => print_settings(&site.settings()?),
        Command::Submit(args) => submit::handle(&site, args),
        Command::Check(args) => check::handle(&site, args),
    }
}

fn print_settings(settings: &Settings) -> Result<()> {
    let contents = toml::to_string_pretty(settings).map_err(store::Error::from)?;
    print!("{contents}");
    Ok(())
}

fn exit_code(err: &Error) -> sysexits::ExitCode {
    match err {
        Error::Config(_) => sysexits::ExitCode::Config,
        Error::Store(store::Error::Io(_)) => sysexits::ExitCode::IoErr,
        Error::Store(store::Error::Deserialize(_)) => sysexits::ExitCode::DataErr,
        Error::Store(store::Error::Serialize(_)) => sysexits::ExitCode::Software,
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "chatbutton",
            "submit",
            "schedule",
            "--enabled",
            "--day",
            "1",
            "--day",
            "2",
            "--from",
            "08:00",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Submit(_)));
    }
}
