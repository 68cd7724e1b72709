use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use console::Emoji;
use tracing_subscriber::EnvFilter;

use histcast::{Config, Mp4TagReader, ProgressEvent, ProgressReporter, RunClock, run};

// Emoji with fallback for terminals without Unicode support
static RADIO: Emoji<'_, '_> = Emoji("📻 ", "");
static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static EMPTY: Emoji<'_, '_> = Emoji("🕳️  ", "[-] ");
static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "[x] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Publish podcast feeds from a get_iplayer download history
#[derive(Parser, Debug)]
#[command(name = "histcast")]
#[command(about = "Publish podcast feeds from a get_iplayer download history")]
#[command(version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = histcast::config::DEFAULT_CONFIG)]
    config: PathBuf,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Remove mirror entries no longer justified by the history
    #[arg(long)]
    cleanup: bool,
}

/// Prints run progress to the terminal
struct TerminalReporter {
    verbose: bool,
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::HistoryLoaded { path, records } => {
                if self.verbose {
                    println!(
                        "{BOOKS}Read {} records from {}",
                        records.to_string().cyan(),
                        path.display().to_string().dimmed()
                    );
                }
            }

            ProgressEvent::ProgrammeMatched { programme, matched } => {
                if matched == 0 {
                    println!("{EMPTY}No episodes of {}", programme.yellow());
                } else if self.verbose {
                    println!(
                        "{HEADPHONES}{} • {} episodes",
                        programme.bold().green(),
                        matched.to_string().cyan()
                    );
                }
            }

            ProgressEvent::EpisodeSkipped { programme, episode } => {
                if self.verbose {
                    println!(
                        "  {CROSS}{} {} - {}",
                        programme.yellow(),
                        episode.source.display(),
                        episode.reason.to_string().dimmed()
                    );
                }
            }

            ProgressEvent::StaleEntryRemoved { path, .. } => {
                if self.verbose {
                    println!("  {BROOM}Removed {}", path.display().to_string().dimmed());
                }
            }

            ProgressEvent::MirrorRemoved { path, .. } => {
                if self.verbose {
                    println!("  {BROOM}Removed {}", path.display().to_string().dimmed());
                }
            }

            ProgressEvent::FeedWritten { programme, items, .. } => {
                if self.verbose {
                    println!(
                        "  {SUCCESS}{} ({} items)",
                        programme.green(),
                        items.to_string().cyan()
                    );
                }
            }

            ProgressEvent::ProgrammeFailed { programme, error } => {
                println!("{FAILURE}{} - {}", programme.red(), error.red());
            }

            ProgressEvent::RunCompleted {
                programmes,
                published,
                skipped,
                removed,
                failed,
            } => {
                println!(
                    "\n{PARTY}{} {} programmes, {} published, {} skipped, {} removed, {} failed",
                    "Run complete:".bold().green(),
                    programmes.to_string().cyan(),
                    published.to_string().green().bold(),
                    skipped.to_string().yellow(),
                    removed.to_string().yellow(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    }
                );
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = Config::load(&args.config)
        .and_then(Config::into_settings)
        .with_context(|| {
            format!(
                "Failed to load configuration from {}",
                args.config.display()
            )
        })?;
    settings.cleanup |= args.cleanup;

    if args.verbose > 0 {
        println!(
            "\n{}{} {}\n",
            RADIO,
            "histcast".bold().magenta(),
            "- get_iplayer feed publisher".dimmed()
        );
    }

    let reporter = TerminalReporter {
        verbose: args.verbose > 0,
    };
    let clock = RunClock::system(settings.timezone);

    let summary =
        run(&settings, &Mp4TagReader, &reporter, clock).context("Failed to publish feeds")?;

    if summary.failed() > 0 {
        std::process::exit(1);
    }

    Ok(())
}
