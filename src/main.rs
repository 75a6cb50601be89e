mod action;
mod app;
mod config;
mod error;
mod event;
mod pagination;
mod pokeapi;
mod source;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::pokeapi::PokeApi;
use crate::source::Source;
use crate::tui::EventHandler;

/// Scroll through the PokéAPI Pokémon list, one page at a time.
#[derive(Parser, Debug)]
#[command(name = "pokescroll", version, about)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API base URL, e.g. https://pokeapi.co/api/v2
    #[arg(long)]
    base_url: Option<String>,

    /// Items fetched per page
    #[arg(long, short = 'n')]
    page_size: Option<u32>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref());
    config.apply_overrides(cli.base_url, cli.page_size);
    tracing::info!(
        base_url = %config.api.base_url,
        page_size = config.list.page_size,
        "starting"
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let api = PokeApi::new(&config.api.base_url, config.api.timeout())?;

    let result = run(Arc::new(api), &config).await;

    // Restore terminal
    tui::restore()?;

    result
}

/// Stderr logging is off by default since it would draw over the TUI.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter("info"))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter("off"))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

async fn run(source: Arc<dyn Source>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(source, config.list.page_size, action_tx.clone());
    let size = terminal.size()?;
    app.update(Action::Resize(size.height));

    // Ticks drive autoscroll
    let tick_rate = config.autoscroll.interval();
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
