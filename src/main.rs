// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! `santa`: draw, record and announce a Secret Santa.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envconfig::Envconfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use secret_santa::config::{self, AppConfig};
use secret_santa::notify::{self, SmtpNotifier};
use secret_santa::{AssignmentEngine, ForbiddenPairs, HistoryStore, Roster};

/// Exit status when no draw could be found.
const NO_DRAW: u8 = 2;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a new assignment from a roster
    Draw {
        /// TOML roster of couples and singles
        #[arg(long)]
        roster: PathBuf,

        /// History log (defaults to SANTA_HISTORY_PATH)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Allow pairs drawn in earlier runs
        #[arg(long)]
        ignore_history: bool,

        /// Do not append this draw to the history
        #[arg(long)]
        no_record: bool,

        /// Retry budget (defaults to SANTA_MAX_TRIES)
        #[arg(long)]
        max_tries: Option<usize>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// E-mail every giver their receiver
        #[arg(long)]
        send: bool,

        /// With --send, compose the messages but do not deliver them
        #[arg(long, requires = "send")]
        dry_run: bool,
    },

    /// Inspect or reset the history log
    History {
        /// History log (defaults to SANTA_HISTORY_PATH)
        #[arg(long, global = true)]
        history: Option<PathBuf>,

        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print every recorded draw
    Show,
    /// Delete the history log
    Clear,
}

struct DrawOptions {
    roster: PathBuf,
    history: Option<PathBuf>,
    ignore_history: bool,
    no_record: bool,
    max_tries: Option<usize>,
    seed: Option<u64>,
    send: bool,
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    config::load_dotenv();
    let config = AppConfig::init_from_env().context("failed to load configuration from env")?;

    match cli.command {
        Commands::Draw {
            roster,
            history,
            ignore_history,
            no_record,
            max_tries,
            seed,
            send,
            dry_run,
        } => draw(
            &config,
            DrawOptions {
                roster,
                history,
                ignore_history,
                no_record,
                max_tries,
                seed,
                send,
                dry_run,
            },
        ),
        Commands::History { history, action } => {
            let store = HistoryStore::open(history.unwrap_or_else(|| config.history_path.clone()));
            match action {
                HistoryAction::Show => show_history(&store)?,
                HistoryAction::Clear => store.clear()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn draw(config: &AppConfig, options: DrawOptions) -> Result<ExitCode> {
    let participants = Roster::load(&options.roster)?.collect()?;
    let store = HistoryStore::open(options.history.unwrap_or_else(|| config.history_path.clone()));
    let forbidden = if options.ignore_history {
        ForbiddenPairs::new()
    } else {
        store.load_forbidden()?
    };
    let max_tries = match options.max_tries {
        Some(0) => anyhow::bail!("--max-tries must be at least 1"),
        Some(n) => n,
        None => config.max_tries()?,
    };
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Everything needed to send is checked before drawing, so a draw that
    // cannot be delivered is never recorded.
    let mailer = if options.send {
        if participants.emails.is_empty() {
            anyhow::bail!("the roster has no e-mail addresses, nothing to send");
        }
        let settings = config.smtp.settings().context("SMTP configuration")?;
        let notifier = SmtpNotifier::new(&settings)?;
        Some((settings, notifier))
    } else {
        None
    };

    let mut engine = AssignmentEngine::new(
        &participants.people,
        &participants.partners,
        &forbidden,
        max_tries,
    );
    let Some(assignment) = engine.search(&mut rng) else {
        eprintln!("No valid Secret Santa draw was found for these names.");
        eprintln!("Tip: add people or change the composition of couples and singles.");
        if !forbidden.is_empty() {
            eprintln!(
                "Earlier draws rule out {} pairs; retry with --ignore-history or run `santa history clear`.",
                forbidden.len()
            );
        }
        return Ok(ExitCode::from(NO_DRAW));
    };

    if config.super_secret() {
        info!("super secret mode: the draw is not shown");
    } else {
        let width = participants
            .people
            .iter()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        println!("{:<width$}  Receiver", "Giver");
        for (giver, receiver) in assignment.iter() {
            println!("{:<width$}  {}", giver, receiver);
        }
    }

    if let Some((settings, mut notifier)) = mailer {
        let sent = notify::dispatch(
            &assignment,
            &participants.emails,
            &mut notifier,
            options.dry_run,
        )
        .context("sending failed")?;
        let verb = if options.dry_run { "Would send" } else { "Sent" };
        eprintln!(
            "{} e-mails to {} participants from {}.",
            verb,
            sent.len(),
            settings.from_header()
        );
    }

    if !options.no_record {
        store.append(&assignment)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn show_history(store: &HistoryStore) -> Result<()> {
    let records = store.records()?;
    if records.is_empty() {
        println!("No draws recorded in {}.", store.path().display());
        return Ok(());
    }
    for record in records {
        println!("{}", record.drawn_at.to_rfc3339());
        for pair in &record.pairs {
            println!("  {} -> {}", pair.giver, pair.receiver);
        }
    }
    Ok(())
}
