// memscope: step-through stack and heap visualizer

use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use memscope::config::Config;
use memscope::document::Document;
use memscope::layout::{describe_event, describe_record, frame_listings};
use memscope::logging;
use memscope::projection::{describe_step, ViewState};
use memscope::timeline::{build_with, EventLog, ScopeNaming};
use memscope::ui::App;

/// Step through the stack and heap of an analyzed program
#[derive(Debug, Parser)]
#[command(name = "memscope")]
#[command(about = "Step-through stack and heap visualizer", version)]
struct Args {
    /// Program-structure document (JSON)
    document: PathBuf,

    /// Config file path (defaults are used if not specified)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Step to open at (clamped to the timeline)
    #[arg(long)]
    step: Option<usize>,

    /// Give every if/else/while occurrence its own scope
    #[arg(long)]
    unique_scopes: bool,

    /// Canvas width override
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height override
    #[arg(long)]
    height: Option<f64>,

    /// Print the timeline and the state at --step instead of starting the TUI
    #[arg(long, conflicts_with = "json")]
    dump: bool,

    /// Print the timeline as JSON instead of starting the TUI
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.dump || args.json {
        logging::init_stderr_logging()?;
    } else {
        // The TUI owns the terminal, so logs go to a file
        let log_file_path = logging::init_file_logging("memscope")?;
        eprintln!("memscope logs: {}", log_file_path.display());
    }

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if args.unique_scopes {
        config.timeline.scope_naming = ScopeNaming::Unique;
    }
    if let Some(width) = args.width {
        config.layout.width = width;
    }
    if let Some(height) = args.height {
        config.layout.height = height;
    }
    config.validate()?;

    let document = Document::from_path(&args.document)?;
    let log = build_with(&document, &config.build_options());
    info!(
        document = %args.document.display(),
        nodes = document.nodes().len(),
        events = log.len(),
        "timeline ready"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(());
    }

    if args.dump {
        dump(&log, args.step);
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(log, config).with_step(args.step.unwrap_or(0));
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Plain-text rendition of the timeline and the state at one step
fn dump(log: &EventLog, step: Option<usize>) {
    println!("Timeline ({} events)", log.len());
    for (i, event) in log.iter().enumerate() {
        println!("{:>4}  {}", i + 1, describe_event(event));
    }

    let mut view = ViewState::at_end(log);
    if let Some(step) = step {
        view.goto_clamped(log, i64::try_from(step).unwrap_or(i64::MAX));
    }
    let projection = view.project(log);

    println!();
    println!("{}  {}", view.indicator(log), describe_step(log, view.index()));
    for listing in frame_listings(&projection) {
        println!("{}", listing.title());
        for line in &listing.lines {
            println!("  {}", line);
        }
    }

    let heap: Vec<_> = projection.heap().collect();
    if !heap.is_empty() {
        println!("Heap");
        for record in heap {
            println!("  {}", describe_record(record));
        }
    }
}
