use clap::Parser;
use color_eyre::eyre::{self, Context};
use flexi_logger::Logger;
use log::info;
use std::io::{BufRead, Write};

use weekboard::configuration::config::Config;
use weekboard::configuration::options::{Command, Opt};
use weekboard::configuration::types::parse_human_date;
use weekboard::model::board::Board;
use weekboard::model::event::EventRecord;
use weekboard::store::PendingDelete;

const DEFAULT_CONFIG_FILE: &str = "weekboard.toml";

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let args = Opt::parse();

    if args.create_default_config {
        return create_default_config();
    }

    let config = Config::new(&args.config_file, &args)?;

    if args.restore_missing_templates {
        Board::restore_missing_templates(&config)?;
    }
    if args.restore_missing_assets {
        Board::restore_missing_assets(&config)?;
    }

    let mut board = Board::new(config)?;

    match args.command.clone().unwrap_or(Command::Render) {
        Command::Render => board.create_html_pages(),
        Command::List => list_events(&board),
        Command::Add {
            title,
            day,
            start,
            end,
            kind,
            capacity,
        } => add_event(&mut board, title, day, start, end, kind, capacity),
        Command::Remove { key, yes } => remove_event(&mut board, &key, yes),
    }
}

fn create_default_config() -> eyre::Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        eyre::bail!("{} already exists, not overwriting it", DEFAULT_CONFIG_FILE);
    }

    std::fs::write(path, doku::to_toml::<Config>())
        .wrap_err("could not write the default config file")?;
    info!("wrote the example config to {}", DEFAULT_CONFIG_FILE);

    Ok(())
}

fn list_events(board: &Board) -> eyre::Result<()> {
    let mut events = board.store().load_all()?;
    events.sort_by_key(|event| (event.day, event.start));

    for event in events {
        println!("{}  {}", event.storage_key(), event);
    }

    Ok(())
}

fn add_event(
    board: &mut Board,
    title: String,
    day: Option<String>,
    start: String,
    end: String,
    kind: Option<String>,
    capacity: Option<String>,
) -> eyre::Result<()> {
    let day = match day {
        Some(text) => parse_human_date(&text)?,
        None => board.today(),
    };
    let start = chrono::NaiveTime::parse_from_str(&start, "%H:%M")
        .wrap_err("the start time must look like HH:MM")?;
    let end = chrono::NaiveTime::parse_from_str(&end, "%H:%M")
        .wrap_err("the end time must look like HH:MM")?;

    let record = EventRecord {
        title,
        day,
        start,
        end,
        kind: kind.unwrap_or_else(|| board.config().default_event_kind.clone()),
        capacity: capacity.unwrap_or_default(),
    };

    let key = board.add_event(record)?;
    info!("saved {}", key);

    board.create_html_pages()
}

fn remove_event(board: &mut Board, key: &str, yes: bool) -> eyre::Result<()> {
    let pending = board.request_delete(key);

    let Some(record) = pending.record()? else {
        pending.cancel();
        eyre::bail!("no event is stored under {}", key);
    };

    if yes || confirm_deletion(&pending, &record)? {
        pending.confirm()?;
        info!("deleted {}", key);
        board.refresh()?;
        board.create_html_pages()
    } else {
        pending.cancel();
        info!("kept {}", key);
        Ok(())
    }
}

/// Ask on the terminal whether the pending deletion should go ahead
fn confirm_deletion(pending: &PendingDelete<'_>, record: &EventRecord) -> eyre::Result<bool> {
    eprint!(
        "Do you really want to delete {} on {} ({})? [y/N] ",
        record,
        record.day,
        pending.key()
    );
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
