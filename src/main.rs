use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;

use cycle_board::config::loader;
use cycle_board::engine::{Event, IdentityWatcher};
use cycle_board::route::parse_route;
use cycle_board::store::{IssueStore, StubStore};
use cycle_board::types::IdentityTriple;
use cycle_board::views::cycle::{Body, LoadingIndicator, Screen};
use cycle_board::views::{CycleView, SyncOutcome};

#[derive(Parser)]
#[command(name = "cycle-board", version, about = "Cycle issue view")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store fixture (JSON) to serve cycles, filters and issues from.
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a route once and print the resulting view.
    Open {
        /// Route such as `/<workspace>/projects/<project>/cycles/<cycle>`.
        route: String,
    },
    /// Read routes from stdin and keep the view in sync.
    ///
    /// Besides routes, `:refresh`, `:transfer` and `:close` are accepted.
    Watch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    // Load config.
    let config = loader::load_config(cli.config.as_deref())?;
    let fixture = cli
        .fixture
        .or(config.defaults.fixture.clone())
        .context("no store fixture: pass --fixture or set defaults.fixture")?;
    let store = Arc::new(load_store(&fixture)?);
    let view = Arc::new(CycleView::new(Arc::clone(&store), &config.fetch));

    tracing::info!("cycle-board starting");

    let rt = tokio::runtime::Runtime::new().context("tokio runtime init")?;
    match cli.command {
        Commands::Open { route } => {
            let identity = parse_route(&route)
                .with_context(|| format!("unrecognised route: {route}"))?;
            rt.block_on(view.sync(identity))?;
            print_screen(&view, &store);
            Ok(())
        }
        Commands::Watch => rt.block_on(watch(view, store)),
    }
}

fn load_store(path: &Path) -> Result<StubStore> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    StubStore::from_json(&json).with_context(|| format!("loading fixture {}", path.display()))
}

async fn watch(view: Arc<CycleView<StubStore>>, store: Arc<StubStore>) -> Result<()> {
    let (notify_tx, notify_rx) = std::sync::mpsc::channel::<Event>();
    let handle = IdentityWatcher::spawn(Arc::clone(&view), IdentityTriple::default(), notify_tx);

    // Print on a dedicated OS thread so stdin reading never waits on output.
    let printer = {
        let view = Arc::clone(&view);
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            while let Ok(event) = notify_rx.recv() {
                match event {
                    Event::Synced(SyncOutcome::Superseded(_) | SyncOutcome::Unchanged(_)) => {}
                    Event::Synced(_) => print_screen(&view, &store),
                    Event::FetchError(e) => eprintln!("error: {:#}", anyhow::Error::new(e)),
                }
            }
        })
    };

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match line.trim() {
            "" => {}
            ":refresh" => match view.revalidate().await {
                Ok(_) => print_screen(&view, &store),
                Err(e) => eprintln!("error: {:#}", anyhow::Error::new(e)),
            },
            ":transfer" => {
                if !view.open_transfer() {
                    eprintln!("transfer is only available for completed cycles");
                }
                print_screen(&view, &store);
            }
            ":close" => {
                view.close_transfer();
                print_screen(&view, &store);
            }
            route => match parse_route(route) {
                Some(identity) => handle.navigate(identity),
                None => eprintln!("unrecognised route: {route}"),
            },
        }
    }

    // Closing the identity channel stops the watcher; the printer exits once
    // the last in-flight sync has dropped its event sender.
    drop(handle);
    let _ = tokio::task::spawn_blocking(move || printer.join()).await;
    Ok(())
}

fn print_screen(view: &CycleView<StubStore>, store: &StubStore) {
    let mut out = std::io::stdout().lock();
    let _ = write_screen(&mut out, &view.screen(), store);
}

fn write_screen(out: &mut impl Write, screen: &Screen, store: &StubStore) -> std::io::Result<()> {
    let ready = match screen {
        Screen::Blank => return writeln!(out, "(route incomplete, nothing to show)"),
        Screen::Loading(LoadingIndicator::Layout(layout)) => {
            return writeln!(out, "loading {} layout...", layout.as_str());
        }
        Screen::Loading(LoadingIndicator::Spinner) => return writeln!(out, "loading..."),
        Screen::Ready(ready) => ready,
    };

    writeln!(out, "cycle {} [{}]", ready.scope, ready.status.as_str())?;
    if ready.transfer_affordance {
        let modal = if ready.transfer_modal_open { "open" } else { "closed" };
        writeln!(out, "  transfer pending issues available (modal {modal})")?;
    }
    writeln!(
        out,
        "  filters: layout={}",
        ready.active_layout.map_or("-", |l| l.as_str())
    )?;
    match ready.body {
        Body::Empty => writeln!(out, "  no issues in this cycle")?,
        Body::Layout(None) => writeln!(out, "  (no renderer for this layout)")?,
        Body::Layout(Some(renderer)) => {
            writeln!(out, "  {}", renderer.label())?;
            let grouped = store.grouped_issue_ids(&ready.scope).unwrap_or_default();
            for (group, ids) in grouped.groups() {
                writeln!(out, "    {group} ({}): {}", ids.len(), ids.join(", "))?;
            }
        }
    }
    if ready.peek_overlay {
        writeln!(out, "  peek overlay mounted")?;
    }
    Ok(())
}
