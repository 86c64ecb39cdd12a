use clap::Parser;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Mutex, mpsc};
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pv::controller::Controller;
use pv::domain::{PVConfig, PVError};
use pv::model::{Model, Status};
use pv::products::product_columns;
use pv::snapshot::Snapshot;
use pv::ui::TableUI;

/// Browse a product listing snapshot in the terminal.
#[derive(Parser, Debug)]
#[command(name = "pv", version, about)]
struct Args {
    /// JSON snapshot of the form {"products": [...]}, `-` reads from stdin
    path: String,

    /// Number of products per page
    #[arg(short = 's', long, default_value_t = 10)]
    page_size: usize,

    /// Maximal rendered width of a column
    #[arg(short = 'w', long, default_value_t = 40)]
    max_column_width: usize,

    /// Field used by the category filter
    #[arg(long, default_value = "category")]
    category_field: String,

    /// Event poll time in ms
    #[arg(long, default_value_t = 100)]
    poll: u64,

    /// File receiving the logs
    #[arg(long, default_value = "pv.log")]
    log_file: String,

    /// Enable trace logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(path: &str) -> Result<PathBuf, PVError> {
    if path == "-" {
        return Ok(PathBuf::from(path));
    }
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| PVError::LoadingFailed(e.to_string()))
}

fn init_logging(args: &Args) -> Result<(), PVError> {
    let log_file = File::create(expand_path(&args.log_file)?)?;
    let default_filter = if args.verbose { "pv=trace" } else { "pv=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), PVError> {
    init_logging(&args)?;
    info!("Starting pv!");

    let cfg = PVConfig::default()
        .with_event_poll_time(args.poll)
        .with_page_size(args.page_size)
        .with_max_column_width(args.max_column_width)
        .with_category_field(args.category_field.clone());

    // A duplicated column is a setup mistake and stops us before the first frame
    let columns = product_columns()?;
    let path = expand_path(&args.path)?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("stdin")
        .to_string();

    let mut model = Model::init(&cfg, columns, name);
    let ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    // The snapshot is fetched in the background, the view stays empty until it arrives
    let (tx, rx) = mpsc::channel();
    rayon::spawn(move || {
        if tx.send(Snapshot::load(&path)).is_err() {
            warn!("Viewer was closed before the snapshot was loaded");
        }
    });

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &ui, &controller, &rx);
    ratatui::restore();
    result?;

    info!("Quitting pv!");
    Ok(())
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &TableUI,
    controller: &Controller,
    rx: &Receiver<Result<Snapshot, PVError>>,
) -> Result<(), PVError> {
    while model.status != Status::QUITTING {
        if model.status == Status::LOADING {
            match rx.try_recv() {
                Ok(snapshot) => model.load_snapshot(snapshot),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => model.load_snapshot(Err(
                    PVError::LoadingFailed("loader stopped unexpectedly".into()),
                )),
            }
        }

        terminal.draw(|f| ui.draw(model, f))?;

        let message = controller.handle_event(model)?;
        model.update(message)?;
    }
    Ok(())
}
