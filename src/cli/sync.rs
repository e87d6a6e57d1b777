use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Config,
    error::SyncError,
    management::TokenManager,
    spotify::SpotifyClient,
    success,
    sync::{SyncEngine, SyncEvent, SyncProgress},
    types::{Account, SummaryTableRow, SyncSummary},
    warning,
};

/// Spinner that mirrors sync events on the terminal.
///
/// Stage lines normally go to stdout like every other message. A progress
/// created with [`ConsoleProgress::to_stderr`] writes them to stderr instead,
/// which keeps stdout free for the JSON summary.
pub struct ConsoleProgress {
    pb: ProgressBar,
    stderr: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn to_stderr() -> Self {
        Self::build(true)
    }

    fn build(stderr: bool) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        ConsoleProgress { pb, stderr }
    }

    fn stage(&self, marker: ColoredString, message: String) {
        self.pb.suspend(|| {
            if self.stderr {
                eprintln!("[{}] {}", marker, message);
            } else {
                println!("[{}] {}", marker, message);
            }
        });
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncProgress for ConsoleProgress {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::FetchStarted { account } => {
                self.pb
                    .set_message(format!("Fetching liked songs of the {} account...", account));
            }
            SyncEvent::PageFetched { account, fetched } => {
                self.pb
                    .set_message(format!("Fetched {} liked songs of the {} account...", fetched, account));
            }
            SyncEvent::FetchCompleted { account, count } => self.stage(
                "✓".green().bold(),
                format!("Fetched {} liked songs from the {} account", count, account),
            ),
            SyncEvent::DiffCompleted { missing } => self.stage(
                "o".blue().bold(),
                format!("{} songs are missing in the target account", missing),
            ),
            SyncEvent::WriteStarted { missing, batches } => {
                self.pb
                    .set_message(format!("Adding {} songs in {} batches...", missing, batches));
            }
            SyncEvent::BatchWritten { index, written } => {
                self.pb
                    .set_message(format!("Batch {} saved ({} songs)", index + 1, written));
            }
            SyncEvent::BatchFailed {
                index,
                size,
                reason,
            } => {
                self.pb
                    .suspend(|| warning!("Batch {} ({} songs) failed: {}", index + 1, size, reason));
            }
        }
    }
}

/// Obtains a fresh access token for `account`, refreshing the stored one if
/// it is about to expire.
pub async fn access_token(config: &Config, account: Account) -> Result<String, SyncError> {
    let mut token_mgr = TokenManager::load(account).await?;
    Ok(token_mgr.get_valid_token(config).await?)
}

/// Runs a full sync, or only the planning half with `dry_run`.
///
/// With `json` the summary is the only thing written to stdout, so the output
/// can be piped straight into another tool.
pub async fn sync(config: &Config, json: bool, dry_run: bool) -> Result<SyncSummary, SyncError> {
    let source_token = access_token(config, Account::Source).await?;
    let target_token = access_token(config, Account::Target).await?;

    let client = SpotifyClient::new(config);
    let progress = if json {
        ConsoleProgress::to_stderr()
    } else {
        ConsoleProgress::new()
    };
    let engine = SyncEngine::new(&client, config.sync.clone()).with_progress(&progress);

    let result = if dry_run {
        engine
            .plan(&source_token, &target_token)
            .await
            .map(|plan| SyncSummary {
                message: format!("Dry run: {} songs would be added", plan.missing.len()),
                added: 0,
                source_songs: Some(plan.source_count),
                target_songs: Some(plan.target_count),
            })
    } else {
        engine.sync(&source_token, &target_token).await
    };
    progress.finish();

    let summary = result?;
    print_summary(&summary, json);
    Ok(summary)
}

fn print_summary(summary: &SyncSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(out) => println!("{}", out),
            Err(e) => warning!("Cannot serialize summary: {}", e),
        }
        return;
    }

    if summary.is_in_sync() {
        success!("{}", summary.message);
        return;
    }

    let rows: Vec<SummaryTableRow> = [
        ("source", summary.source_songs),
        ("target", summary.target_songs),
    ]
    .into_iter()
    .map(|(account, songs)| SummaryTableRow {
        account: account.to_string(),
        songs: songs.map_or_else(|| "-".to_string(), |n| n.to_string()),
    })
    .collect();

    println!("{}", Table::new(rows));
    success!("{} Added {} songs.", summary.message, summary.added);
}
