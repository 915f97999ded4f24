//! Flowboard command-line shell.
//!
//! # Responsibility
//! - Drive `flowboard_core` board operations against a local SQLite file.
//! - Print plain-text results; business rules stay in the core crate.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use flowboard_core::db::open_db;
use flowboard_core::{
    default_columns, BoardService, Card, Direction, DuplicateOutcome, MoveOutcome, NoMoveReason,
    SqliteCardStore, TodayState, WipState, STORAGE_KEY,
};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "flowboard.sqlite3";

#[derive(Parser)]
#[command(name = "flowboard")]
#[command(author, version, about = "Personal kanban board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file (defaults to the system temp directory)
    #[arg(long, global = true, env = "FLOWBOARD_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every column with its active cards
    List,

    /// Create a card from a quick-add line, e.g. "Fix bug #ops ^m !tomorrow >doing"
    Add {
        /// Quick-add text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Move a card one column forward or back
    Move {
        /// Card ID
        card_id: String,
        /// next or prev
        direction: String,
    },

    /// Move a card straight into a column
    MoveTo {
        /// Card ID
        card_id: String,
        /// Target column ID
        column_id: String,
    },

    /// Archive a card
    Archive {
        /// Card ID
        card_id: String,
    },

    /// Toggle the blocked flag on a card
    Block {
        /// Card ID
        card_id: String,
    },

    /// Copy a card into its column under a new ID
    Duplicate {
        /// Card ID
        card_id: String,
    },

    /// Pin a card to Today, or unpin it
    Pin {
        /// Card ID
        card_id: String,
    },

    /// Hide a card from Today, or unhide it
    Hide {
        /// Card ID
        card_id: String,
    },

    /// Queue a card as up next for Today, or dequeue it
    Queue {
        /// Card ID
        card_id: String,
    },

    /// Pull the first up-next card into "In Progress"
    StartNext,

    /// Show one column's cards, highest SLA risk first
    Focus {
        /// Column ID or title prefix
        column: String,
    },

    /// Show per-column load and board counters
    Stats,

    /// Show the Today view
    Today,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| flowboard_core::default_log_level());
        flowboard_core::init_logging(level, &dir.to_string_lossy())
            .map_err(|err| anyhow!("logging init failed: {err}"))?;
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open board database at {}", db_path.display()))?;
    let mut service =
        BoardService::load(SqliteCardStore::new(&conn, STORAGE_KEY), default_columns());

    match cli.command {
        Commands::List => print_board(&service),
        Commands::Add { text } => {
            let card = service.quick_add(&text.join(" "))?;
            let column = service
                .board()
                .column(&card.column_id)
                .map_or(card.column_id.as_str(), |column| column.title.as_str());
            println!("Added {} to {}: {}", card.id, column, card.title);
        }
        Commands::Move {
            card_id,
            direction,
        } => {
            let Some(parsed) = Direction::parse(&direction) else {
                bail!("unknown direction `{direction}`; expected next or prev");
            };
            report_move(&card_id, service.move_relative(&card_id, parsed))?;
        }
        Commands::MoveTo { card_id, column_id } => {
            report_move(&card_id, service.move_to(&card_id, &column_id))?;
        }
        Commands::Archive { card_id } => {
            if !service.archive(&card_id) {
                bail!("card not found: {card_id}");
            }
            println!("Archived {card_id}");
        }
        Commands::Block { card_id } => match service.toggle_blocked(&card_id) {
            Some(true) => println!("Blocked {card_id}"),
            Some(false) => println!("Unblocked {card_id}"),
            None => bail!("card not found: {card_id}"),
        },
        Commands::Duplicate { card_id } => match service.duplicate(&card_id) {
            DuplicateOutcome::Created(copy) => println!("Duplicated {card_id} as {}", copy.id),
            DuplicateOutcome::Blocked(blocked) => bail!("{blocked}"),
            DuplicateOutcome::Unchanged(reason) => {
                bail!("{card_id} not duplicated: {}", no_move_reason(reason))
            }
        },
        Commands::Pin { card_id } => {
            toggle_today(&mut service, &card_id, TodayState::Pinned, "Pinned", "Unpinned")?
        }
        Commands::Hide { card_id } => toggle_today(
            &mut service,
            &card_id,
            TodayState::Suppressed,
            "Hid",
            "Unhid",
        )?,
        Commands::Queue { card_id } => toggle_today(
            &mut service,
            &card_id,
            TodayState::Derived,
            "Queued",
            "Dequeued",
        )?,
        Commands::StartNext => match service.start_next() {
            MoveOutcome::Moved { .. } => print_today(&service),
            MoveOutcome::Blocked(blocked) => bail!("{blocked}"),
            MoveOutcome::Unchanged(NoMoveReason::CardNotFound) => println!("Nothing queued."),
            MoveOutcome::Unchanged(reason) => {
                println!("Nothing started: {}", no_move_reason(reason))
            }
        },
        Commands::Focus { column } => print_focus(&service, &column)?,
        Commands::Stats => print_stats(&service),
        Commands::Today => print_today(&service),
    }

    Ok(())
}

fn print_board(service: &BoardService<SqliteCardStore<'_>>) {
    let board = service.board();
    let grouped = board.group_by_column();
    for column in board.columns() {
        let cards = grouped.get(&column.id).map(Vec::as_slice).unwrap_or(&[]);
        match column.wip_limit {
            Some(limit) => println!("{} [{}/{}]", column.title, cards.len(), limit),
            None => println!("{} [{}]", column.title, cards.len()),
        }
        for card in cards {
            println!("  {}", card_line(card));
        }
    }
}

fn toggle_today(
    service: &mut BoardService<SqliteCardStore<'_>>,
    card_id: &str,
    state: TodayState,
    on: &str,
    off: &str,
) -> Result<()> {
    match service.toggle_today_state(card_id, state) {
        Some(true) => println!("{on} {card_id}"),
        Some(false) => println!("{off} {card_id}"),
        None => bail!("card not found: {card_id}"),
    }
    Ok(())
}

fn print_focus(service: &BoardService<SqliteCardStore<'_>>, column: &str) -> Result<()> {
    let board = service.board();
    let Some(target) = board
        .column(column)
        .or_else(|| board.resolve_column_hint(column))
    else {
        bail!("unknown column: {column}");
    };
    let cards = board.focus_cards(&target.id);
    match target.wip_limit {
        Some(limit) => println!("{} [{}/{}]", target.title, cards.len(), limit),
        None => println!("{} [{}]", target.title, cards.len()),
    }
    for card in cards {
        println!("  {} ({})", card_line(card), card.sla_risk.as_str());
    }
    Ok(())
}

fn print_stats(service: &BoardService<SqliteCardStore<'_>>) {
    let stats = service.board().stats(flowboard_core::now_epoch_ms());
    println!(
        "active={} blocked={} archived={}",
        stats.active_cards, stats.blocked_cards, stats.archived_cards
    );
    for load in &stats.columns {
        let state = match load.state {
            WipState::Unlimited => "unlimited",
            WipState::Under => "under",
            WipState::AtLimit => "at limit",
            WipState::OverLimit => "over limit",
        };
        match load.wip_limit {
            Some(limit) => println!("  {}: {}/{} ({state})", load.title, load.count, limit),
            None => println!("  {}: {} ({state})", load.title, load.count),
        }
    }
    println!("avg cycle time: {:.1} days", stats.avg_cycle_time_days);
}

fn print_today(service: &BoardService<SqliteCardStore<'_>>) {
    let plan = service.board().today_plan();
    for (heading, cards) in [
        ("Doing", &plan.doing),
        ("Pinned", &plan.pinned),
        ("Up next", &plan.derived),
    ] {
        println!("{heading}");
        if cards.is_empty() {
            println!("  -");
        }
        for card in cards.iter() {
            println!("  {}", card_line(card));
        }
    }
}

fn report_move(card_id: &str, outcome: MoveOutcome) -> Result<()> {
    match outcome {
        MoveOutcome::Moved { from, to } => {
            println!("Moved {card_id}: {from} -> {to}");
            Ok(())
        }
        MoveOutcome::Blocked(blocked) => bail!("{blocked}"),
        MoveOutcome::Unchanged(reason) => {
            println!("{card_id} not moved: {}", no_move_reason(reason));
            Ok(())
        }
    }
}

fn no_move_reason(reason: NoMoveReason) -> &'static str {
    match reason {
        NoMoveReason::CardNotFound => "card not found",
        NoMoveReason::CardArchived => "card is archived",
        NoMoveReason::UnknownSourceColumn => "card sits in an unknown column",
        NoMoveReason::UnknownTargetColumn => "unknown target column",
        NoMoveReason::AtBoundary => "already at the board edge",
        NoMoveReason::AlreadyInColumn => "already in that column",
    }
}

fn card_line(card: &Card) -> String {
    let mut line = format!("{}  {}", card.id, card.title);
    if card.blocked {
        line.push_str("  [blocked]");
    }
    if let Some(effort) = card.effort {
        line.push_str(&format!("  ^{effort}"));
    }
    for tag in &card.tags {
        line.push_str(&format!("  #{tag}"));
    }
    if let Some(due) = &card.due_date {
        line.push_str(&format!("  due {due}"));
    }
    line
}
