mod config;
mod console;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use composite_bar::CompositeBar;
use shared::domain::{CompositeId, Dimension};
use storage::{SqliteStateStore, StateBackend};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, normalize_database_url, Settings},
    console::{render, ConsoleHost, TextSurface},
};

#[derive(Parser, Debug)]
#[command(name = "compositebar", about = "Inspect and edit persisted composite bar state")]
struct Cli {
    /// Overrides the configured state database.
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Config file; `compositebar.toml` is read when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = 48)]
    width: u32,
    #[arg(long, global = true, default_value_t = 240)]
    height: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the packed strip, the pinned order and the overflow menu.
    Show,
    Pin {
        id: String,
    },
    Unpin {
        id: String,
    },
    /// Moves `id` to the position of `before`.
    Move {
        id: String,
        before: String,
    },
    /// Activates a composite for this run only and prints the result.
    Activate {
        id: String,
    },
    /// Forgets the stored pin state.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    let database_url = normalize_database_url(&settings.database_url);
    let store = Arc::new(
        SqliteStateStore::new(&database_url)
            .await
            .with_context(|| format!("failed to open state store at '{database_url}'"))?,
    );

    if let Command::Reset = cli.command {
        let removed = store.delete(&settings.bar.storage_key).await?;
        println!(
            "reset {}: {}",
            settings.bar.storage_key,
            if removed { "cleared" } else { "nothing stored" }
        );
        return Ok(());
    }

    let (bar, host, entries) = open_bar(&settings, store).await?;
    bar.layout(Dimension::new(cli.width, cli.height));

    match cli.command {
        Command::Show | Command::Reset => {}
        Command::Pin { id } => bar.pin(&CompositeId::from(id)).await?,
        Command::Unpin { id } => bar.unpin(&CompositeId::from(id)).await?,
        Command::Move { id, before } => {
            bar.move_composite(&CompositeId::from(id), &CompositeId::from(before))
                .await?;
            bar.settle().await;
        }
        Command::Activate { id } => bar.activate_composite(&CompositeId::from(id)),
    }

    println!("strip:");
    for line in render(&entries, host.active_marker().as_ref()) {
        println!("{line}");
    }
    let pinned: Vec<String> = bar
        .pinned_composites()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("pinned: {}", pinned.join(", "));
    if !bar.overflowing_composites().is_empty() {
        println!("overflow:");
        bar.show_overflow_menu();
    }

    bar.shutdown().await?;
    Ok(())
}

async fn open_bar(
    settings: &Settings,
    backend: Arc<dyn StateBackend>,
) -> Result<(CompositeBar, Arc<ConsoleHost>, console::SharedEntries)> {
    let host = Arc::new(ConsoleHost::new(settings.default_composite.as_str()));
    let (surface, entries) = TextSurface::new(
        settings.composites.iter().map(|composite| {
            (
                CompositeId::from(composite.id.as_str()),
                composite.name.clone(),
                composite.size,
            )
        }),
        settings.bar.overflow_action_size,
    );
    let descriptors = settings
        .composites
        .iter()
        .map(|composite| composite.descriptor())
        .collect();

    let bar = CompositeBar::new(
        settings.bar.clone(),
        descriptors,
        host.clone(),
        Box::new(surface),
        backend,
    )
    .await
    .context("failed to load composite bar state")?;
    Ok((bar, host, entries))
}
