//! Binary entrypoint for deck-chrome.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::io::{self, BufRead, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use deck_chrome::chrome::Chrome;
use deck_chrome::config::{Configuration, DeckFile};
use deck_chrome::deck::{Deck, HookRegistry};
use deck_chrome::events::{ControlCommand, DeckFileChanged};
use deck_chrome::runner;
use deck_chrome::watch;

#[derive(Debug, Parser)]
#[command(name = "deck-chrome", version, about = "slide deck presentation chrome")]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Step through every slide once, print the container state per slide,
    /// and exit without entering the interactive loop
    #[arg(long)]
    walkthrough: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        walkthrough,
    } = Args::parse();

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    let deck_file = DeckFile::from_yaml_file(&cfg.deck_path)
        .and_then(DeckFile::validated)
        .with_context(|| format!("failed to load deck from {}", cfg.deck_path.display()))?;
    tracing::info!(
        deck = %cfg.deck_path.display(),
        slides = deck_file.slides.len(),
        resize_window = %humantime::format_duration(cfg.resize_throttle),
        "configuration loaded"
    );

    let hooks = default_hooks();
    let mut deck = Deck::initialize(
        cfg.deck.clone(),
        &deck_file,
        cfg.initial_viewport.into(),
        &hooks,
    );
    let mut chrome = Chrome::new();

    if walkthrough {
        run_walkthrough(&mut deck, &mut chrome);
        return Ok(());
    }

    let (command_tx, command_rx) = mpsc::channel::<ControlCommand>(16);
    let (reload_tx, reload_rx) = mpsc::channel::<DeckFileChanged>(4);

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Bridge notify's sync callback into the async loop:
    // notify -> crossbeam -> tokio channel.
    let (fs_tx, fs_rx) = crossbeam_channel::unbounded::<DeckFileChanged>();
    let _watcher = match watch::start_watcher(&cfg.deck_path, fs_tx) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!("deck watcher unavailable, live reload disabled: {err}");
            None
        }
    };
    tokio::task::spawn_blocking(move || {
        while let Ok(changed) = fs_rx.recv() {
            if reload_tx.blocking_send(changed).is_err() {
                break;
            }
        }
    });

    if cfg.deck.controls {
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match runner::parse_command(&line) {
                    Some(cmd) => {
                        if command_tx.blocking_send(cmd).is_err() {
                            return;
                        }
                    }
                    None => tracing::warn!(input = %line.trim(), "unrecognized control command"),
                }
            }
            tracing::info!("control input closed; initiating shutdown");
            cancel.cancel();
        });
    } else {
        drop(command_tx);
        if io::stdin().is_terminal() {
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                let mut sink = Vec::new();
                match io::stdin().read_to_end(&mut sink) {
                    Ok(_) => tracing::info!("stdin closed; initiating shutdown"),
                    Err(err) => tracing::warn!("stdin watcher failed: {err}"),
                }
                cancel.cancel();
            });
        }
    }

    runner::run(&mut deck, &mut chrome, &cfg, command_rx, reload_rx, cancel).await
}

/// Hooks add-ons may name in their `after-load` field.
fn default_hooks() -> HookRegistry {
    let mut hooks = HookRegistry::new();
    hooks.register("highlight-code", |deck: &mut Deck| {
        deck.grant_capability("code-highlighting");
        tracing::info!("code highlighting enabled");
    });
    hooks
}

fn run_walkthrough(deck: &mut Deck, chrome: &mut Chrome) {
    let rows = runner::walkthrough(deck, chrome);
    println!("# deck walkthrough\n# slides: {}\n", rows.len());
    for (idx, (name, classes)) in rows.iter().enumerate() {
        println!("  {:>3}: {:<24} [{classes}]", idx + 1, name);
    }
}
