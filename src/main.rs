//! Termdeck - a terminal slide-presentation player.
//!
//! # Usage
//!
//! ```bash
//! termdeck              # play ./slides (or ./.deck if present)
//! termdeck talk/        # play a directory of slide files
//! termdeck deck.md      # play a single multi-slide document
//! termdeck -p           # serve the browser speaker console too
//! ```

use anyhow::Result;
use clap::Parser;

use termdeck::app::{App, ExitAction};
use termdeck::presenter::Presenter;
use termdeck::{deck, playback, term};

/// A terminal slide deck player with Markdown and asciinema support
#[derive(Parser, Debug)]
#[command(name = "termdeck", version, about, long_about = None)]
struct Cli {
    /// Slides directory or a single Markdown document
    #[arg(value_name = "PATH")]
    path: Option<String>,

    /// Slide number to start at (1-based)
    #[arg(short = 's', long, value_name = "N")]
    start_at: Option<String>,

    /// Serve the speaker console and wait for a keypress before starting
    #[arg(short, long)]
    presenter: bool,

    /// Print a WezTerm config snippet for presentation mode and exit
    #[arg(long)]
    wezterm_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.wezterm_config {
        println!("{}", term::wezterm_snippet());
        return Ok(());
    }

    // Parsed by hand so a bad value gets a deck-flavored message instead
    // of a clap usage dump.
    let start_index = match cli.start_at.as_deref() {
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n >= 1 => n - 1,
            _ => {
                eprintln!("Error: --start-at must be a positive integer (got: {value})");
                std::process::exit(1);
            }
        },
        None => 0,
    };

    let source = deck::resolve_source(cli.path.as_deref())?;
    if let Err(err) = deck::validate(&source) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let total = deck::load(&source)?.len();
    if start_index >= total {
        eprintln!(
            "Error: --start-at value {} exceeds total slides ({total})",
            start_index + 1
        );
        std::process::exit(1);
    }

    // The console URL and start prompt print before the terminal is
    // maximized so they stay readable.
    let presenter = if cli.presenter {
        Some(Presenter::start()?)
    } else {
        None
    };

    term::enter_presentation_mode();
    let result = run_session(&source, start_index, presenter);
    term::exit_presentation_mode();
    result
}

/// Alternate between the interactive UI and cast playback until the user
/// quits. Each playback hands back a resume slide for the next UI run.
fn run_session(
    source: &deck::DeckSource,
    start_index: usize,
    presenter: Option<Presenter>,
) -> Result<()> {
    let mut app = App::new(source.clone())
        .with_start_index(start_index)
        .with_presenter(presenter);

    loop {
        match app.run()? {
            ExitAction::Quit => break,
            ExitAction::Play { path, slide_index } => {
                // Playback navigation needs the slide list to skip over
                // neighboring casts; a failed reload degrades to staying
                // on the current slide.
                let slides = deck::load(source).unwrap_or_default();
                let resume = playback::run(&slides, slide_index, &path);
                app.set_start_index(resume);
            }
        }
    }
    Ok(())
}
