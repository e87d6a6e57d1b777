use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use likesync::{cli, config, error, types::Account};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize the source or the target account with Spotify
    Auth(AuthOptions),

    /// Copy liked songs missing in the target account from the source account
    Sync(SyncOptions),

    /// Show which accounts are authorized
    Status,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Account role to log in
    #[clap(long, value_enum)]
    pub account: Account,
}

#[derive(Parser, Debug, Clone)]
pub struct SyncOptions {
    /// Print the summary as JSON
    #[clap(long)]
    pub json: bool,

    /// Only compute what would be added
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Command::Status = cli.command {
        cli::status().await;
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match config::Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    match cli.command {
        Command::Auth(opt) => {
            if let Err(e) = cli::auth(Arc::clone(&config), opt.account).await {
                error!("Authentication failed. Err: {}", e);
            }
        }
        Command::Sync(opt) => {
            if let Err(e) = cli::sync(&config, opt.json, opt.dry_run).await {
                error!("Sync failed. Err: {}", e);
            }
        }
        Command::Status | Command::Completions(_) => {}
    }
}
