//! CLI command implementations.

use crate::config::GroveConfig;
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use grove_core::{id_to_path, resolve_title, GraphNode};
use grove_graph::{apply_graph_delta, capture_context, ordered_ids, Graph};
use grove_sync::{handle_request, JsonLineTransport, SyncEngine, SyncError};
use grove_watcher::{load_vault, EventMapper, LoadResult, VaultWatcher};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Initialize Grove in a vault.
pub fn init(path: &Path) -> Result<()> {
    let config_path = GroveConfig::vault_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    GroveConfig::default().write(&config_path)?;

    println!("{} Initialized Grove in {}", "✓".green(), path.display());
    println!("  Run {} to load your notes", "grove load".cyan());

    Ok(())
}

/// Load a vault and report on it.
pub fn load(path: &Path, output: Option<&Path>) -> Result<()> {
    let config = GroveConfig::load(path)?;
    let (graph, result) = load_with_spinner(path, &config)?;

    println!(
        "{} Loaded {} notes ({} links) in {}ms",
        "✓".green(),
        result.files_loaded.to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        result.duration_ms
    );

    if result.files_loaded == 0 {
        eprintln!("\n{} No notes found. Check:", "⚠ Warning:".yellow());
        eprintln!("  - Notes use the .md extension");
        eprintln!("  - The folder isn't excluded or hidden");
    }

    print_errors(&result.errors);

    if let Some(out_path) = output {
        export_graph(&graph, out_path)?;
    }

    Ok(())
}

/// Print the vault's notes in traversal order.
pub fn order(path: &Path) -> Result<()> {
    let config = GroveConfig::load(path)?;
    let (graph, result) = load_with_spinner(path, &config)?;
    print_errors(&result.errors);

    for (position, id) in ordered_ids(&graph).iter().enumerate() {
        if let Some(node) = graph.get(id.as_str()) {
            println!(
                "{:>4}  {} {}",
                position + 1,
                resolve_title(node).cyan(),
                format!("({})", id).dimmed()
            );
        }
    }

    Ok(())
}

/// Capture and print a context node.
pub fn context(id: &str, path: &Path, distance: Option<usize>, write: bool) -> Result<()> {
    let config = GroveConfig::load(path)?;
    let (graph, _) = load_with_spinner(path, &config)?;
    let distance = distance.unwrap_or(config.max_context_distance);

    let node = capture_context(&graph, id, distance)?
        .ok_or_else(|| anyhow!("no note with id '{}'", id))?;

    let contained = node.ui_metadata.contained_node_ids.as_deref().unwrap_or(&[]);
    eprintln!(
        "{} Captured {} notes within {} hops of {}",
        "✓".green(),
        contained.len().to_string().cyan(),
        distance,
        id.cyan()
    );

    if write {
        let written = write_context(path, &node)?;
        eprintln!("{} Wrote {}", "✓".green(), written.display());
    } else {
        print!("{}", node.content);
    }

    Ok(())
}

/// Watch the vault and stream deltas on stdout.
///
/// Lines read from stdin are treated as JSON-RPC requests and answered
/// on stdout between deltas.
pub async fn watch(path: &Path) -> Result<()> {
    let config = GroveConfig::load(path)?;
    let transport = Arc::new(JsonLineTransport::new(tokio::io::stdout()));
    let mut engine = SyncEngine::new(Arc::clone(&transport), config.load_options());

    let result = engine.load(path).await?;
    eprintln!(
        "{} Loaded {} notes in {}ms",
        "✓".green(),
        result.files_loaded,
        result.duration_ms
    );
    print_errors(&result.errors);

    let watcher = VaultWatcher::new(path, config.excluded_dirs.clone())?;
    let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Some(event) = watcher.recv() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    eprintln!("  Press {} to stop", "Ctrl+C".cyan());

    let mut requests = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    bail!("watcher stopped");
                };
                match engine.handle_event(&event).await {
                    Ok(_) => {}
                    Err(SyncError::Rejected(e)) => warn!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
            line = requests.next_line(), if stdin_open => {
                match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        let (graph, next_seq) = engine.snapshot();
                        if let Some(response) = handle_request(&line, &graph, next_seq) {
                            transport.write_line(&response).await?;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Loads the vault into a fresh graph behind a spinner.
fn load_with_spinner(path: &Path, config: &GroveConfig) -> Result<(Graph, LoadResult)> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Reading notes...");

    let loaded = load_graph(path, config);

    spinner.finish_and_clear();
    loaded
}

fn load_graph(path: &Path, config: &GroveConfig) -> Result<(Graph, LoadResult)> {
    let mut mapper = EventMapper::new();
    let result = load_vault(path, &config.load_options(), &mut mapper)
        .with_context(|| format!("failed to load vault {}", path.display()))?;
    let graph = apply_graph_delta(&Graph::empty(), &result.delta);
    Ok((graph, result))
}

fn print_errors(errors: &[(String, String)]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("\n{} notes skipped:", "⚠".yellow());
    for (file, error) in errors.iter().take(5) {
        eprintln!("  {} - {}", file.red(), error);
    }
    if errors.len() > 5 {
        eprintln!("  ... and {} more", errors.len() - 5);
    }
}

fn export_graph(graph: &Graph, path: &Path) -> Result<()> {
    let export = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "stats": {
            "nodeCount": graph.node_count(),
            "edgeCount": graph.edge_count()
        },
        "order": ordered_ids(graph),
        "graph": graph
    });

    fs::write(path, serde_json::to_string_pretty(&export)?)?;
    println!("{} Exported to {}", "✓".green(), path.display());

    Ok(())
}

/// Writes a context node to its place under the vault.
fn write_context(vault: &Path, node: &GraphNode) -> Result<PathBuf> {
    let target = vault.join(id_to_path(&node.id));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &node.content)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(target)
}
