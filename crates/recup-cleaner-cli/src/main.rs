mod commands;
mod logging;
mod progress;

use std::io::{self, BufRead};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use console::style;
use dotenv::dotenv;
use indicatif::HumanBytes;
use progress::ChannelReporter;
use recup_cleaner_core::{
    list_files, ActionLog, AppConfig, CleanerEngine, FinishReport, ProgressReporter, SessionState,
    SessionStats,
};
use tracing::{error, info, warn};

/// What the user asked for on stdin while the monitor loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserCommand {
    /// PhotoRec is done: finalize the rest and reorganize.
    Finish,
    /// Stop now, leave unfinished folders as they are.
    Cancel,
}

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match recup_cleaner_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Watch(clean_args)) => {
            clean_args.apply(&mut config);
            if let Err(err) = run_watch(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::CleanOnce(clean_args)) => {
            clean_args.apply(&mut config);
            if let Err(err) = run_clean_once(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::List { dir }) => run_list(&dir),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_watch(config: &AppConfig) -> Result<()> {
    let engine = CleanerEngine::from_config(config)?;
    print_intro(engine.base_dir());

    let (tx, rx) = mpsc::channel();
    let status_thread = progress::spawn_status_handler(rx);
    let reporter = Arc::new(ChannelReporter::new(tx));

    let mut state = open_session(config, reporter.as_ref());
    let cancel_token = state.cancel_token();
    let stop = Arc::new(AtomicBool::new(false));

    let worker = {
        let engine = engine.clone();
        let reporter = Arc::clone(&reporter);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            engine.run(&mut state, reporter.as_ref(), &stop);
            state
        })
    };

    let command = wait_for_user_command();
    if command == UserCommand::Cancel {
        cancel_token.store(true, Ordering::Relaxed);
    }
    stop.store(true, Ordering::Relaxed);

    let mut state = worker
        .join()
        .map_err(|_| anyhow!("monitor thread panicked"))?;

    let report = match command {
        UserCommand::Finish => {
            reporter.on_message("Finalizing, please wait...");
            Some(engine.finish(&mut state, reporter.as_ref()))
        }
        UserCommand::Cancel => {
            state.close_action_log();
            None
        }
    };

    drop(reporter);
    let _ = status_thread.join();

    match report {
        Some(report) => print_summary(&report),
        None => {
            warn!("Cancelled; unfinished folders were left as they are");
            println!("{}", style("Cancelled.").yellow());
        }
    }
    Ok(())
}

fn run_clean_once(config: &AppConfig) -> Result<()> {
    let engine = CleanerEngine::from_config(config)?;

    let (tx, rx) = mpsc::channel();
    let status_thread = progress::spawn_status_handler(rx);
    let reporter = ChannelReporter::new(tx);

    let mut state = open_session(config, &reporter);
    let report = engine.clean_once(&mut state, &reporter);

    drop(reporter);
    let _ = status_thread.join();

    print_summary(&report);
    Ok(())
}

fn run_list(dir: &Path) {
    let files = list_files(dir);
    if files.is_empty() {
        println!("No files in {}", dir.display());
        return;
    }
    for file in &files {
        println!(
            "{:<40} {:<8} {:>12}",
            file.stem,
            file.extension,
            HumanBytes(file.size).to_string()
        );
    }
    println!("{} files", files.len());
}

/// Fresh session state with the action log attached when logging is enabled.
/// A log that cannot be created is reported and the session runs without it.
fn open_session(config: &AppConfig, reporter: &dyn ProgressReporter) -> SessionState {
    let mut state = SessionState::new();
    if !config.log_enabled {
        return state;
    }

    let Some(log_dir) = config.action_log_dir() else {
        return state;
    };
    match ActionLog::create_in(log_dir) {
        Ok(log) => state.set_action_log(Some(log)),
        Err(err) => {
            warn!("Error creating log file in {}: {}", log_dir.display(), err);
            reporter.on_message(&format!("Error creating log file: {}", err));
        }
    }
    state
}

/// Block until the user types `y` (finish) or `q` (cancel). A closed stdin
/// cancels, since nobody is left to say PhotoRec has finished.
fn wait_for_user_command() -> UserCommand {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match line.trim().to_lowercase().as_str() {
            "y" => return UserCommand::Finish,
            "q" => return UserCommand::Cancel,
            _ => continue,
        }
    }
    warn!("stdin closed before a finish command was given");
    UserCommand::Cancel
}

fn print_intro(base_dir: &Path) {
    let rule = "=".repeat(72);
    println!("\n{}", rule);
    println!("{}", style("  PhotoRec Cleaner").bold());
    println!("{}", rule);
    println!("  Output directory: {}", base_dir.display().to_string().green());
    println!(
        "  Type {} + Enter when PhotoRec is done to finish cleaning, {} + Enter to cancel.\n",
        "'y'".blue(),
        "'q'".blue()
    );
}

/// Plain one-line summary for the log files; colour stays on stdout.
fn summary_line(stats: &SessionStats) -> String {
    format!(
        "{} folders processed, {} files kept, {} files deleted, {} freed",
        stats.folders_finalized,
        stats.kept_count,
        stats.deleted_count,
        HumanBytes(stats.deleted_bytes),
    )
}

fn print_summary(report: &FinishReport) {
    println!();
    info!("{}", summary_line(&report.stats));
    println!("{}", style("Processing complete").bold());
    println!(
        "  Folders processed : {}",
        report.stats.folders_finalized.to_string().cyan()
    );
    println!(
        "  Files kept        : {}",
        report.stats.kept_count.to_string().green()
    );
    println!(
        "  Files deleted     : {}",
        report.stats.deleted_count.to_string().red()
    );
    println!(
        "  Space freed       : {}",
        HumanBytes(report.stats.deleted_bytes).to_string().green()
    );
    if let Some(reorganize) = &report.reorganize {
        println!(
            "  Reorganized       : {} files into {} type folders ({} failed)",
            reorganize.files_moved, reorganize.type_folders, reorganize.files_failed
        );
    }
    if report.cancelled {
        println!("  {}", "Stopped early: cancelled".yellow());
    }
}
