//! Terminal host for artgrid.
//!
//! # Responsibility
//! - Resolve configuration from file, environment and flags.
//! - Drive a `TableSession` and print its state; no selection logic lives here.

use anyhow::{Context, Result};
use artgrid_core::{
    init_logging_from_config, AppConfig, Artwork, CachingPageFetcher, HttpPageFetcher,
    SessionError, TableSession, WalkError,
};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

const TITLE_WIDTH: usize = 40;
const ORIGIN_WIDTH: usize = 16;
const ARTIST_WIDTH: usize = 28;

#[derive(Parser, Debug)]
#[command(
    name = "artgrid",
    version,
    about = "Paged artwork table with cross-page row selection",
    arg_required_else_help = true
)]
struct Cli {
    /// JSON config file; `ARTGRID_*` variables override its values.
    #[arg(long, env = "ARTGRID_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    api_base_url: Option<String>,

    #[arg(long)]
    page_size: Option<u32>,

    /// Pages kept in the LRU cache (0 disables caching).
    #[arg(long)]
    cache_pages: Option<usize>,

    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the table.
    Page {
        #[arg(default_value_t = 1)]
        page: u64,
    },
    /// Select N rows across pages, starting from page 1.
    Select {
        count: u64,
        /// Rows toggled by hand before the bulk selection runs.
        #[arg(long = "toggle", value_name = "ID")]
        toggles: Vec<u64>,
        /// Page shown after selecting.
        #[arg(long, default_value_t = 1)]
        show_page: u64,
    },
    /// Print the core library version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("artgrid_core {}", artgrid_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    init_logging_from_config(&config)
        .map_err(anyhow::Error::msg)
        .context("failed to start logging")?;
    info!(
        "event=cli_start module=cli status=ok page_size={} cache_pages={}",
        config.page_size, config.cache_pages
    );

    let http = HttpPageFetcher::new(
        config.api_base_url.as_str(),
        config.page_size,
        config.request_timeout(),
    )
    .context("failed to build HTTP client")?;
    let fetcher = CachingPageFetcher::new(http, config.cache_pages);
    let mut session =
        TableSession::open(fetcher, config.page_size).context("failed to load first page")?;

    match cli.command {
        Command::Page { page } => {
            if page != 1 {
                session.load_page(page)?;
            }
            print_page(&session);
        }
        Command::Select {
            count,
            toggles,
            show_page,
        } => {
            for id in toggles {
                session.toggle_row(id);
            }
            let requested = session.set_rows_to_select(Some(count));
            if requested != count {
                println!("rows to select clamped to {requested}");
            }
            match session.select_rows() {
                Ok(report) => println!(
                    "selected {} new rows over {} pages ({})",
                    report.newly_selected.len(),
                    report.pages_fetched.len(),
                    report.stop.as_str()
                ),
                Err(SessionError::Walk(err @ WalkError::Fetch { .. })) => {
                    // Partial progress is already in the selection; report and keep going.
                    eprintln!("warning: {err}");
                }
                Err(err) => return Err(err.into()),
            }
            if show_page != session.current_page() {
                session.load_page(show_page)?;
            }
            print_page(&session);
            println!("selected ids: {:?}", session.selection().selected_ids());
        }
        Command::Version => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(value) = &cli.api_base_url {
        config.api_base_url = value.clone();
    }
    if let Some(value) = cli.page_size {
        config.page_size = value;
    }
    if let Some(value) = cli.cache_pages {
        config.cache_pages = value;
    }
    if let Some(value) = &cli.log_level {
        config.log_level = Some(value.clone());
    }
    if let Some(value) = &cli.log_dir {
        config.log_dir = Some(value.clone());
    }
    config.validate().context("invalid command-line options")?;
    Ok(config)
}

fn print_page<F: artgrid_core::PageFetcher>(session: &TableSession<F>) {
    println!(
        "page {}/{} (rows {}-{} of {})",
        session.current_page(),
        session.page_count(),
        session.first() + 1,
        session.first() + session.rows().len() as u64,
        session.total_records()
    );
    println!(
        "{:<3} {:>8}  {:<TITLE_WIDTH$}  {:<ORIGIN_WIDTH$}  {:<ARTIST_WIDTH$}  {:>6}  {:>6}",
        "sel", "id", "title", "origin", "artist", "start", "end"
    );
    for row in session.rows() {
        print_row(row, session.is_selected(row.id));
    }
}

fn print_row(row: &Artwork, selected: bool) {
    let artist = row
        .artist_display
        .as_deref()
        .and_then(|value| value.lines().next());
    println!(
        "{:<3} {:>8}  {:<TITLE_WIDTH$}  {:<ORIGIN_WIDTH$}  {:<ARTIST_WIDTH$}  {:>6}  {:>6}",
        if selected { "[x]" } else { "[ ]" },
        row.id,
        clip(row.title.as_deref(), TITLE_WIDTH),
        clip(row.place_of_origin.as_deref(), ORIGIN_WIDTH),
        clip(artist, ARTIST_WIDTH),
        year(row.date_start),
        year(row.date_end),
    );
}

fn clip(value: Option<&str>, width: usize) -> String {
    let value = value.unwrap_or("-");
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

fn year(value: Option<i32>) -> String {
    value.map(|year| year.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{clip, Cli};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip(Some("Nighthawks"), 20), "Nighthawks");
        assert_eq!(clip(Some("The Bedroom at Arles"), 8), "The Bed~");
        assert_eq!(clip(None, 8), "-");
    }
}
