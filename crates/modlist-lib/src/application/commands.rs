//! Command execution handlers
//!
//! Every handler works against a [`CommandSession`]. Fatal problems
//! (configuration, unreadable database, failed writes) are returned as
//! errors and end the process with a non-zero exit code; per-row provider
//! failures are reported and counted instead.

use anyhow::{Context, Result, anyhow, bail};
use std::time::Duration;
use tracing::{debug, info};

use crate::application::cli::{AddArgs, DownloadArgs, ReconcileArgs, ServerArgs};
use crate::application::session::CommandSession;
use crate::application::{CliConfig, Commands};
use crate::display::Display;
use crate::modlist::download::is_plain_component;
use crate::modlist::server::DEFAULT_STOP_GRACE;
use crate::modlist::{
    AddRequest, Database, DownloadOptions, DownloadOutcome, DownloadSummary, Downloader, ModRecord,
    ReconcileMode, ReconcileOptions, ReconcileReport, Reconciler, RowOutcome, ServerLauncher, TailOutcome,
    add_record, latest_game_version, majority_game_version, tail_for_pattern,
};
use crate::primitives::{Loader, ModGroup, ModType};

/// Execute CLI commands with a live session
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let command = match config.command {
        Some(cmd) => cmd,
        None => {
            Display::status().message("modlist - Minecraft mod database manager");
            Display::status().subtle("Run 'modlist --help' for usage information");
            return Ok(());
        }
    };

    let session = CommandSession::new(config.app_config)?;
    execute_command_with_session(command, &session).await
}

/// Execute a specific command with a provided session (for testing)
pub async fn execute_command_with_session(command: Commands, session: &CommandSession) -> Result<()> {
    match command {
        Commands::Add(args) => handle_add(session, args).await,
        Commands::Remove { id, mod_type, loader } => handle_remove(session, &id, mod_type, loader),
        Commands::List { group, mod_type } => handle_list(session, group, mod_type),
        Commands::Validate(args) => handle_reconcile(session, &args, ReconcileMode::Validate)
            .await
            .map(|_| ()),
        Commands::Update(args) => handle_reconcile(session, &args, ReconcileMode::Update)
            .await
            .map(|_| ()),
        Commands::Download { reconcile, download } => {
            Display::status().step(1, 2, "Validating the database");
            let database = handle_reconcile(session, &reconcile, ReconcileMode::Validate).await?;
            Display::status().step(2, 2, "Downloading files");
            download_records(session, &database, &download).await
        }
        Commands::DownloadMods(args) => {
            let database = session.load_database()?;
            download_records(session, &database, &args).await
        }
        Commands::StartServer(args) => handle_start_server(session, &args).await,
    }
}

async fn handle_add(session: &CommandSession, args: AddArgs) -> Result<()> {
    let mut database = session.load_or_create_database()?;
    let source = args.source.clone();

    let request = AddRequest {
        source: args.source,
        provider: args.provider,
        id: args.id,
        mod_type: args.mod_type,
        loader: args.loader,
        group: args.group,
        game_version: args.game_version,
        version: args.version,
        download_url: args.download_url,
        name: args.name,
    };

    Display::status().checking(&source);
    let record = add_record(&mut database, session.registry(), request)
        .await
        .with_context(|| format!("Failed to add {}", source))?;
    session.save_database(&database)?;

    Display::status().success(
        &record.label(),
        &format!("{} for {}", record.current.version, record.current.game_version),
    );
    Ok(())
}

fn handle_remove(
    session: &CommandSession,
    id: &str,
    mod_type: Option<ModType>,
    loader: Option<Loader>,
) -> Result<()> {
    let mut database = session.load_database()?;
    let removed = database.remove_record(id, mod_type, loader.as_ref())?;
    session.save_database(&database)?;

    let labels: Vec<String> = removed.iter().map(ModRecord::label).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    Display::status().message(&format!("Removed {} record(s):", labels.len()));
    Display::status().list(&labels);
    Ok(())
}

fn handle_list(session: &CommandSession, group: Option<ModGroup>, mod_type: Option<ModType>) -> Result<()> {
    let database = session.load_database()?;
    let rows: Vec<Vec<String>> = database
        .records()
        .iter()
        .filter(|record| group.is_none_or(|g| record.group == g))
        .filter(|record| mod_type.is_none_or(|t| record.mod_type == t))
        .map(list_row)
        .collect();

    Display::status().table(
        &["Group", "Type", "ID", "Loader", "Game", "Current", "Next", "Latest", "Provider"],
        &rows,
    );
    Display::status().subtle(&format!("{} of {} records", rows.len(), database.len()));
    Ok(())
}

fn list_row(record: &ModRecord) -> Vec<String> {
    vec![
        record.group.to_string(),
        record.mod_type.to_string(),
        record.id.clone(),
        record.loader.to_string(),
        record.current.game_version.clone(),
        record.current.version.clone(),
        record.next.version.clone(),
        record.latest.version.clone(),
        record.provider.to_string(),
    ]
}

/// Reconcile, save and report; returns the updated database
async fn handle_reconcile(
    session: &CommandSession,
    args: &ReconcileArgs,
    mode: ReconcileMode,
) -> Result<Database> {
    let mut database = session.load_database()?;
    let options = ReconcileOptions {
        mode,
        next_game_version: args.next_game_version.clone(),
        latest_ceiling: args.latest_ceiling.clone(),
    };

    let progress = Display::progress().bar(database.len() as u64);
    let reconciler = Reconciler::new(session.registry(), options);
    let report = reconciler
        .reconcile_with(&mut database, |row| {
            progress.tick(&row.label);
            progress.inc();
        })
        .await;

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            progress.abandon("Aborted");
            return Err(e).context("Cannot validate the database");
        }
    };
    progress.finish(&format!("Checked {} records", report.rows.len()));

    session.save_database(&database)?;
    print_report(&report);
    if let Some(latest) = latest_game_version(database.records()) {
        info!("Newest game version any record supports: {}", latest);
    }
    Ok(database)
}

/// Only the counters reach the terminal; row details are debug logs
fn print_report(report: &ReconcileReport) {
    for line in row_details(report) {
        debug!("{}", line);
    }
    Display::status().counts("Summary", &report.summary.entries());
}

/// One line per row that needs attention
fn row_details(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();
    for row in &report.rows {
        match &row.outcome {
            RowOutcome::NotFound { reason } => lines.push(format!("{}: not found: {}", row.label, reason)),
            RowOutcome::Errored { reason } => lines.push(format!("{}: failed: {}", row.label, reason)),
            RowOutcome::Resolved | RowOutcome::Skipped => {}
        }
        if row.drifted {
            lines.push(format!("{}: edited outside modlist", row.label));
        }
    }
    lines
}

async fn download_records(session: &CommandSession, database: &Database, args: &DownloadArgs) -> Result<()> {
    let options = DownloadOptions {
        root: session.config().download_folder.clone(),
        slot: args.slot,
        force: args.force,
    };
    let root = options.root.display().to_string();

    let eligible = Downloader::eligible(database.records()).count();
    let progress = Display::progress().bar(eligible as u64);
    let mut failures = Vec::new();

    let downloader = Downloader::new(session.networking(), options);
    let summary: DownloadSummary = downloader
        .download_all_with(database.records(), |label, outcome| {
            progress.tick(label);
            progress.inc();
            if let DownloadOutcome::Failed { reason } = outcome {
                failures.push((label.to_string(), reason.clone()));
            }
        })
        .await;
    progress.finish(&format!("Downloaded into {}", root));

    for (label, reason) in &failures {
        Display::status().error(label, reason);
    }
    if failures.is_empty() {
        Display::status().complete("All files are in place");
    }
    Display::status().counts(
        "Downloads",
        &[
            ("Downloaded", summary.downloaded),
            ("Skipped", summary.skipped),
            ("Failed", summary.failed),
        ],
    );
    Ok(())
}

async fn handle_start_server(session: &CommandSession, args: &ServerArgs) -> Result<()> {
    let database = session.load_database()?;

    let game_version = args
        .game_version
        .clone()
        .or_else(|| majority_game_version(database.records()))
        .ok_or_else(|| anyhow!("No game version given and the database has none"))?;
    if !is_plain_component(&game_version) {
        bail!("'{}' cannot be used as a server folder name", game_version);
    }

    let jar = match &args.jar {
        Some(jar) => jar.clone(),
        None => server_jar(database.records(), &game_version)
            .ok_or_else(|| anyhow!("No launcher or server record for {}; pass --jar", game_version))?,
    };

    let working_dir = session.config().download_folder.join(&game_version);
    let launcher = ServerLauncher::java(&working_dir, &jar, &args.java_args).accept_eula(args.accept_eula);

    let mut handle = launcher
        .start()
        .await
        .with_context(|| format!("Failed to start the {} server", game_version))?;

    let spinner = Display::progress().spinner(&format!("Waiting for the {} server", game_version));
    let outcome = tail_for_pattern(
        &mut handle,
        &args.success_pattern,
        &args.failure_pattern,
        Duration::from_secs(args.timeout),
    )
    .await;
    handle
        .stop(DEFAULT_STOP_GRACE)
        .await
        .context("Failed to stop the server")?;

    match outcome {
        TailOutcome::Matched => {
            spinner.finish(&format!("Server {} started", game_version));
            Ok(())
        }
        TailOutcome::Failed(line) => {
            spinner.abandon("Server failed");
            bail!("Server failed to start: {}", line)
        }
        TailOutcome::Exited => {
            spinner.abandon("Server exited");
            bail!("Server exited before it finished starting")
        }
        TailOutcome::TimedOut => {
            spinner.abandon("Server timed out");
            bail!("Server did not start within {} seconds", args.timeout)
        }
    }
}

/// Jar of the launcher record for a game version, else of the server record
fn server_jar(records: &[ModRecord], game_version: &str) -> Option<String> {
    [ModType::Launcher, ModType::Server].into_iter().find_map(|mod_type| {
        records
            .iter()
            .filter(|record| record.group != ModGroup::Block && record.mod_type == mod_type)
            .find(|record| record.current.game_version == game_version && !record.jar.is_empty())
            .map(|record| record.jar.clone())
    })
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
