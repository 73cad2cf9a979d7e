mod handlers;
mod logger;
mod worker;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use photobook_async_runtime::{EditorCommand, EditorUpdate, channels};
use photobook_layout::{
    Book, Editor, EditorOptions, FsStore, LayerKind, SpreadMeta, SpreadStore, Viewport,
};
use std::path::{Path, PathBuf};

use crate::logger::AppLogger;

#[derive(Parser)]
#[command(name = "pbk", about = "Photo book spread editor", version)]
struct Cli {
    /// Project directory holding saved spreads, images and preferences
    #[arg(short, long, global = true, default_value = "photobook")]
    project: PathBuf,

    /// Editor config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, global = true, default_value = "1440")]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, global = true, default_value = "900")]
    height: f32,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print worker updates as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page geometry of a spread
    Layout {
        #[arg(default_value = "0")]
        spread: usize,
    },

    /// Place an image on a spread
    AddImage {
        #[arg(short, long, default_value = "0")]
        spread: usize,
        path: PathBuf,
    },

    /// Place a text object on a spread
    AddText {
        #[arg(short, long, default_value = "0")]
        spread: usize,
        text: String,
    },

    /// List saved spreads
    List,

    /// Show the objects saved on a spread
    Show { spread: usize },

    /// Move a spread's saved content to another position
    Reorder { from: usize, to: usize },

    /// Delete the saved content of a spread
    Delete { spread: usize },

    /// Add two pages to the end of the book
    AddSpread,

    /// Run editor commands from a file of JSON lines ("-" for stdin)
    Run { script: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger = AppLogger::new(500, level);
    logger
        .clone()
        .init()
        .context("Failed to install logger")?;

    let options = match &cli.config {
        Some(path) => EditorOptions::load(path).await?,
        None => EditorOptions::default(),
    };
    let viewport = Viewport::new(cli.width, cli.height);
    let store = FsStore::open(&cli.project).await?;

    let commands = match cli.command {
        Commands::Layout { spread } => {
            let editor = Editor::open(store, options, viewport).await?;
            return print_layout(&editor, spread, cli.json);
        }
        Commands::List => return list_spreads(store, &options, cli.json).await,
        Commands::Show { spread } => return show_spread(store, spread, cli.json).await,
        Commands::AddImage { spread, path } => vec![
            EditorCommand::GotoSpread { index: spread },
            EditorCommand::AddImage { path },
        ],
        Commands::AddText { spread, text } => vec![
            EditorCommand::GotoSpread { index: spread },
            EditorCommand::AddText { text },
        ],
        Commands::Reorder { from, to } => vec![EditorCommand::ReorderSpreads { from, to }],
        Commands::Delete { spread } => vec![EditorCommand::DeleteSpread { index: spread }],
        Commands::AddSpread => vec![EditorCommand::AddSpread],
        Commands::Run { script } => read_script(&script).await?,
    };

    let editor = Editor::open(store, options, viewport).await?;
    let failures = run_session(editor, commands, cli.json).await;

    let problems = logger.problem_count();
    if problems > 0 && !cli.json {
        eprintln!("{problems} warning(s) logged");
        if let Some(message) = logger.latest_message() {
            eprintln!("Last: {message}");
        }
    }
    if failures > 0 {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}

/// Feed commands to the worker, then print every update it sent.
/// Returns the number of error updates.
async fn run_session(editor: Editor<FsStore>, commands: Vec<EditorCommand>, json: bool) -> usize {
    let ((command_tx, command_rx), (update_tx, mut update_rx)) = channels();
    for cmd in commands {
        let _ = command_tx.send(cmd);
    }
    // Closing the channel lets the worker flush and exit
    drop(command_tx);

    worker::worker_task(editor, command_rx, update_tx).await;

    let mut failures = 0;
    while let Ok(update) = update_rx.try_recv() {
        if matches!(update, EditorUpdate::Error { .. }) {
            failures += 1;
        }
        if json {
            match serde_json::to_string(&update) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("Failed to encode update: {e}"),
            }
        } else {
            print_update(&update);
        }
    }
    failures
}

fn print_update(update: &EditorUpdate) {
    match update {
        EditorUpdate::SpreadChanged { index, label } => println!("Spread {index}: {label}"),
        EditorUpdate::Layers { layers } => {
            if layers.is_empty() {
                println!("  (no objects)");
            }
            for layer in layers.iter().rev() {
                let kind = match layer.kind {
                    LayerKind::Image => "image",
                    LayerKind::Text => "text",
                };
                println!("  [{}] {kind:<5} {} ({})", layer.z, layer.name, layer.id);
            }
        }
        EditorUpdate::SavedSpreads { spreads } => print_metas(spreads),
        EditorUpdate::Zoom { zoom } => println!("Zoom {:.0}%", zoom * 100.0),
        EditorUpdate::ImageAdded {
            id, blob_stored, ..
        } => {
            if *blob_stored {
                println!("Added {id}");
            } else {
                println!("Added {id} (image kept inline, not in the image store)");
            }
        }
        EditorUpdate::TextAdded { id } => println!("Added {id}"),
        EditorUpdate::Saved { index } => println!("Saved spread {index}"),
        EditorUpdate::Notice { message } => println!("{message}"),
        EditorUpdate::Error { message } => eprintln!("Error: {message}"),
    }
}

fn print_metas(spreads: &[SpreadMeta]) {
    if spreads.is_empty() {
        println!("No saved spreads");
    }
    for meta in spreads {
        let pages = match meta.page_range {
            None => "cover".to_string(),
            Some(range) if range.is_single() => format!("page {}", range.first),
            Some(range) => format!("pages {}-{}", range.first, range.last),
        };
        println!(
            "  {:>2}  {pages:<12} saved {}",
            meta.spread_index,
            meta.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_layout(editor: &Editor<FsStore>, spread: usize, json: bool) -> Result<()> {
    let layout = editor.layout_for(spread)?;
    let label = editor.book().spread_label(layout.spread.index);

    if json {
        let value = serde_json::json!({
            "spread": layout.spread,
            "label": label,
            "geometry": layout.geometry,
            "pages": layout.pages,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Spread {}: {label}", layout.spread.index);
    println!(
        "  {:?} layout, scale {:.3}, gutter {:.0}px",
        layout.geometry.device, layout.geometry.scale, layout.geometry.gutter
    );
    for page in &layout.pages {
        println!(
            "  {:?} page at ({:.0}, {:.0}) {:.0}x{:.0}{}",
            page.side,
            page.rect.x,
            page.rect.y,
            page.rect.width,
            page.rect.height,
            if page.locked { ", locked" } else { "" }
        );
    }
    for marker in layout.markers(editor.theme()) {
        if let Some(text) = &marker.text {
            println!("  marker {:?}: {text}", marker.kind);
        }
    }
    Ok(())
}

async fn list_spreads(store: FsStore, options: &EditorOptions, json: bool) -> Result<()> {
    let store = SpreadStore::open(store).await?;
    let total_pages = match store.load_preferences().await {
        Ok(Some(preferences)) => preferences.total_pages,
        _ => options.total_pages,
    };
    let book = Book::new(total_pages)?;
    let spreads = store.saved_spreads();

    if json {
        println!("{}", serde_json::to_string_pretty(&spreads)?);
    } else {
        println!(
            "{} of {} spreads saved ({} pages)",
            spreads.len(),
            book.spread_count(),
            book.total_pages()
        );
        print_metas(&spreads);
    }
    Ok(())
}

async fn show_spread(store: FsStore, spread: usize, json: bool) -> Result<()> {
    let store = SpreadStore::open(store).await?;
    let Some(record) = store.load(spread).await? else {
        println!("Spread {spread} has no saved content");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    println!(
        "Spread {} saved {} with {} object(s)",
        record.spread_index,
        record.saved_at.format("%Y-%m-%d %H:%M:%S"),
        record.objects.len()
    );
    for obj in &record.objects {
        println!(
            "  {} {:?} at ({:.0}, {:.0}) scale {:.2}x{:.2}",
            obj.id,
            obj.name(),
            obj.transform.left,
            obj.transform.top,
            obj.transform.scale_x,
            obj.transform.scale_y
        );
    }
    Ok(())
}

async fn read_script(path: &Path) -> Result<Vec<EditorCommand>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut text).await?;
        text
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))?
    };
    parse_script(&text)
}

/// One JSON command per line. Blank lines and lines starting with `#` are skipped.
fn parse_script(text: &str) -> Result<Vec<EditorCommand>> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid command on line {n}"))
        })
        .collect()
}
