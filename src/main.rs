use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gitea_import::config::SystemConfig;
use gitea_import::gitea::GiteaClient;
use gitea_import::import::{Importer, Session};

#[derive(Parser)]
#[command(name = "gitea-import")]
#[command(version, about = "Import local git repositories into a Gitea instance")]
struct Cli {
    /// Base URL of the Gitea instance
    url: String,
    /// API token, also used as the password when pushing
    api_token: String,
    /// Change list: one "<org>/<repo> <true|false>" per line
    change_list: String,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            usage();
            return ExitCode::from(1);
        }
    };

    setup_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn usage() {
    println!("{}", Cli::command().render_usage());
    println!("Each change list line is \"<org>/<repo> <true|false>\"; the flag marks the repository private.");
    println!("Put -- before the arguments when a value starts with '-'.");
    println!("Run with --help for more details.");
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = SystemConfig::default();

    let client = GiteaClient::connect(&cli.url, &cli.api_token)?;
    let session = Session::establish(&client, &cli.api_token)?;
    info!("Authenticated as: {}", session.username);

    let file = File::open(&cli.change_list)
        .with_context(|| format!("Failed to open change list {}", cli.change_list))?;

    let root = std::env::current_dir()?;
    Importer::new(&client, session, config, root).run(BufReader::new(file))?;

    Ok(())
}
