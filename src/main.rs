use std::cell::Cell;
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use comicrat::bookmark::Bookmarks;
use comicrat::comic::Comic;
use comicrat::geometry::Size;
use comicrat::input::KeyboardEventSource;
use comicrat::main_app::{App, run_app_with_event_source};
use comicrat::navigation::ViewMode;
use comicrat::panic_handler;
use comicrat::settings::Settings;
use comicrat::viewer::{Viewer, ViewerOptions};

/// Terminal comic book reader with panel-by-panel navigation.
#[derive(Parser)]
#[command(name = "comicrat", version, about)]
struct Args {
    /// Comic descriptor JSON produced by a panel segmenter
    comic: PathBuf,

    /// Directory holding the page images (defaults to the descriptor's
    /// directory)
    #[arg(long)]
    images_dir: Option<String>,

    /// Bookmark file (defaults to the user config directory)
    #[arg(long)]
    bookmarks: Option<PathBuf>,

    /// Start in whole-page view instead of panel view
    #[arg(long)]
    page_view: bool,

    /// Write logs to this file
    #[arg(long, default_value = "comicrat.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("failed to create log file {}", args.log_file.display()))?,
    )?;
    info!("Starting comicrat");
    panic_handler::initialize_panic_handler();

    let settings = Settings::load_or_create();

    let comic = Comic::load(&args.comic)?;
    let images_dir = args
        .images_dir
        .or_else(|| settings.images_dir.clone())
        .unwrap_or_else(|| {
            args.comic
                .parent()
                .map(|dir| dir.to_string_lossy().into_owned())
                .filter(|dir| !dir.is_empty())
                .unwrap_or_else(|| ".".to_string())
        });

    let bookmarks_path = args
        .bookmarks
        .or_else(|| settings.bookmarks_file.clone())
        .or_else(Settings::default_bookmarks_path)
        .map(|path| path.to_string_lossy().into_owned());
    if let Some(path) = &bookmarks_path {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Failed to create bookmark directory: {}", e);
            }
        }
    }
    let bookmarks = Bookmarks::load_or_ephemeral(bookmarks_path.as_deref());

    let mode = if args.page_view || !settings.panel_view {
        ViewMode::Page
    } else {
        ViewMode::Panel
    };

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let container = Rc::new(Cell::new(Size::new(
        f32::from(cols),
        f32::from(rows.saturating_sub(1)),
    )));

    let viewer = Viewer::new(
        comic,
        ViewerOptions {
            images_base: images_dir,
            container: {
                let container = Rc::clone(&container);
                Box::new(move || container.get())
            },
            store: Box::new(bookmarks),
            mode,
        },
    )?;
    let mut app = App::new(viewer, container)?;

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut events = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {:?}", err);
        println!("{err:?}");
    }

    info!("Shutting down comicrat");
    Ok(())
}
