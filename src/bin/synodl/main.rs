use anyhow::{Context, Result, bail};
use clap::Parser;
use dialoguer::Password;
use log::{LevelFilter, debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use synodl::SynoError;
use synodl::client::DownloadStation;
use synodl::utils::{format_task_details, format_task_table};

mod cli;
mod config;
mod watch;

use cli::{Cli, Command};
use config::{Connection, Settings};
use watch::ProgressWatcher;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match cli.config.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let connection = Connection::resolve(&cli, settings);

    // Signals keep their default behaviour until a session exists
    let synods = connect(connection)?;
    let interrupted = install_interrupt_handler()?;
    let result = run(&synods, cli.command, &interrupted);

    match synods.close() {
        Ok(()) => debug!("Logged out"),
        Err(e) => warn!("Failed to log out: {e}"),
    }
    result
}

/// Lets the running command finish and the session close on SIGINT/SIGTERM
fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = interrupted.clone();
    ctrlc::set_handler(move || {
        if is_repeated_signal(&handler_flag) {
            std::process::exit(130);
        }
    })
    .context("Failed to set signal handler")?;
    Ok(interrupted)
}

/// Records the signal. A second one doesn't wait for the session to close.
fn is_repeated_signal(interrupted: &AtomicBool) -> bool {
    interrupted.swap(true, Ordering::SeqCst)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Error).filter(Some("synodl"), level);
    if verbosity > 2 {
        // HTTP stack too
        builder.filter_level(LevelFilter::Debug);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn connect(connection: Connection) -> Result<DownloadStation> {
    let password = match connection.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt(format!("{}@{}'s password", connection.user, connection.host))
            .interact()
            .context("Failed to read password")?,
    };

    let mut builder = DownloadStation::builder()
        .host(connection.host.as_str())
        .port(connection.port)
        .https(connection.secure)
        .accept_invalid_certs(connection.insecure)
        .username(connection.user.as_str())
        .password(password);
    if let Some(timeout) = connection.timeout {
        builder = builder.timeout(timeout);
    }

    builder.connect().with_context(|| {
        format!(
            "Failed to log in to {}:{} as {}",
            connection.host, connection.port, connection.user
        )
    })
}

fn run(synods: &DownloadStation, command: Command, interrupted: &AtomicBool) -> Result<()> {
    match command {
        Command::Add {
            destination,
            source_user,
            source_password,
            urls,
        } => add_downloads(
            synods,
            &urls,
            destination.as_deref(),
            source_user.as_deref(),
            source_password.as_deref(),
        ),
        Command::List { watch: false, .. } => list_downloads(synods),
        Command::List {
            watch: true,
            interval,
        } => ProgressWatcher::new(synods, Duration::from_secs(interval), interrupted).start(),
        Command::Info { ids } => show_downloads(synods, &ids),
        Command::Delete { force, all, ids } => delete_downloads(synods, ids, force, all),
    }
}

fn add_downloads(
    synods: &DownloadStation,
    urls: &[String],
    destination: Option<&str>,
    user: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    for url in urls {
        info!("Adding download {url}");
        synods
            .add(url, destination, user, password)?
            .into_result()
            .with_context(|| format!("Failed to add {url}"))?;
    }
    Ok(())
}

fn list_downloads(synods: &DownloadStation) -> Result<()> {
    let tasks = synods.list().context("Failed to list downloads")?;
    print!("{}", format_task_table(&tasks.tasks));
    Ok(())
}

fn show_downloads(synods: &DownloadStation, ids: &[String]) -> Result<()> {
    let info = synods
        .get_details(ids)
        .context("Failed to get download details")?;
    let blocks: Vec<String> = info.tasks.iter().map(format_task_details).collect();
    print!("{}", blocks.join("\n"));
    Ok(())
}

fn delete_downloads(
    synods: &DownloadStation,
    ids: Vec<String>,
    force: bool,
    all: bool,
) -> Result<()> {
    let ids = if all {
        synods.list()?.tasks.into_iter().map(|task| task.id).collect()
    } else {
        ids
    };
    if ids.is_empty() {
        info!("Nothing to delete");
        return Ok(());
    }

    info!("Deleting downloads {}", ids.join(","));
    let acknowledgement = synods
        .delete(&ids, force)?
        .into_result()
        .context("Failed to delete downloads")?;

    let failed = acknowledgement.failed_tasks();
    for task in &failed {
        let error = SynoError::Api {
            code: Some(task.error),
        };
        eprintln!("Could not delete {}: {error}", task.id);
    }
    if !failed.is_empty() {
        bail!("{} download(s) not deleted", failed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_signal_is_repeated() {
        let interrupted = AtomicBool::new(false);
        assert!(!is_repeated_signal(&interrupted));
        assert!(interrupted.load(Ordering::SeqCst));
        assert!(is_repeated_signal(&interrupted));
    }
}
