//! Single-consumer event loop tying the deck, chrome, and inputs together.
//!
//! All deck and container mutation happens on this loop: control commands,
//! auto-advance ticks, deck-file reloads, and the throttle's trailing edge
//! are drained one at a time, and each handler runs to completion before the
//! next event is looked at.

use std::future;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chrome::Chrome;
use crate::config::{Configuration, DeckFile};
use crate::deck::Deck;
use crate::element::ClassList;
use crate::events::{ControlCommand, DeckEvent, DeckFileChanged, Viewport};
use crate::throttle::{Gate, Throttle};

pub async fn run(
    deck: &mut Deck,
    chrome: &mut Chrome,
    cfg: &Configuration,
    mut commands: Receiver<ControlCommand>,
    mut reloads: Receiver<DeckFileChanged>,
    cancel: CancellationToken,
) -> Result<()> {
    let ready = deck.ready();
    chrome.handle_event(deck, ready);
    log_progress(deck);

    let mut throttle = Throttle::new(cfg.resize_throttle);
    let mut pending_viewport: Option<Viewport> = None;
    let mut ticker = deck.options().auto_advance.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; consume it so
        // the opening slide gets a full period on screen.
        ticker.reset();
        ticker
    });
    let mut commands_open = true;
    let mut reloads_open = true;

    loop {
        let trailing = throttle.trailing_deadline();

        select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = commands.recv(), if commands_open => {
                match maybe_cmd {
                    Some(ControlCommand::Quit) => break,
                    Some(ControlCommand::Next) => {
                        let event = deck.next();
                        dispatch(deck, chrome, event);
                    }
                    Some(ControlCommand::Previous) => {
                        let event = deck.previous();
                        dispatch(deck, chrome, event);
                    }
                    Some(ControlCommand::Back) => {
                        let event = deck.back();
                        dispatch(deck, chrome, event);
                    }
                    Some(ControlCommand::GoTo(index)) => {
                        let event = deck.go_to(index);
                        dispatch(deck, chrome, event);
                    }
                    Some(ControlCommand::Resize(viewport)) => {
                        match throttle.accept(Instant::now()) {
                            Gate::Run => apply_resize(deck, chrome, viewport),
                            Gate::Suppressed => {
                                pending_viewport = Some(viewport);
                                debug!(
                                    width = viewport.width,
                                    height = viewport.height,
                                    "resize coalesced"
                                );
                            }
                        }
                    }
                    None => {
                        debug!("control input closed");
                        commands_open = false;
                    }
                }
            }

            maybe_changed = reloads.recv(), if reloads_open => {
                match maybe_changed {
                    Some(DeckFileChanged) => reload_deck(deck, chrome, &cfg.deck_path),
                    None => {
                        debug!("deck watcher closed");
                        reloads_open = false;
                    }
                }
            }

            _ = tick(ticker.as_mut()) => {
                let event = deck.next();
                if event.is_none() {
                    debug!("auto-advance reached the last slide");
                }
                dispatch(deck, chrome, event);
            }

            _ = sleep_until_opt(trailing) => {
                if throttle.fire_trailing(Instant::now()) {
                    if let Some(viewport) = pending_viewport.take() {
                        apply_resize(deck, chrome, viewport);
                    }
                }
            }
        }
    }

    Ok(())
}

fn dispatch(deck: &mut Deck, chrome: &mut Chrome, event: Option<DeckEvent>) {
    if let Some(event) = event {
        chrome.handle_event(deck, event);
        log_progress(deck);
    }
}

fn apply_resize(deck: &mut Deck, chrome: &mut Chrome, viewport: Viewport) {
    deck.resize(viewport);
    chrome.handle_resize(deck);
}

fn reload_deck(deck: &mut Deck, chrome: &mut Chrome, path: &Path) {
    match DeckFile::from_yaml_file(path).and_then(DeckFile::validated) {
        Ok(file) => {
            let event = deck.reload(&file);
            chrome.handle_event(deck, event);
            log_progress(deck);
        }
        Err(err) => warn!("deck reload failed, keeping current deck: {err:#}"),
    }
}

fn log_progress(deck: &Deck) {
    if deck.options().progress {
        info!(
            slide = %deck.present_slide().name(),
            position = deck.present_index() + 1,
            total = deck.slide_count(),
            progress_pct = (deck.progress() * 100.0).round() as u32,
            "showing slide"
        );
    }
}

async fn tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

/// Parse one control line. Unknown input yields `None`.
#[must_use]
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    let lowered = line.trim().to_ascii_lowercase();
    let mut parts = lowered.split_whitespace();
    let head = parts.next()?;
    let cmd = match head {
        "next" | "n" => ControlCommand::Next,
        "prev" | "previous" | "p" => ControlCommand::Previous,
        "back" | "b" => ControlCommand::Back,
        "goto" | "g" => {
            let index: usize = parts.next()?.parse().ok()?;
            // Control input is one-based; the deck indexes from zero.
            ControlCommand::GoTo(index.checked_sub(1)?)
        }
        "resize" | "r" => {
            let width: u32 = parts.next()?.parse().ok()?;
            let height: u32 = parts.next()?.parse().ok()?;
            ControlCommand::Resize(Viewport::new(width, height))
        }
        "quit" | "q" | "exit" => ControlCommand::Quit,
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(cmd)
}

/// Step through every slide once, returning the slide name and the container
/// class attribute after each synchronization.
pub fn walkthrough(deck: &mut Deck, chrome: &mut Chrome) -> Vec<(String, String)> {
    let mut rows = Vec::with_capacity(deck.slide_count());
    let ready = deck.ready();
    chrome.handle_event(deck, ready);
    rows.push((
        deck.present_slide().name().to_owned(),
        deck.container().class_attr().to_owned(),
    ));
    while let Some(event) = deck.next() {
        chrome.handle_event(deck, event);
        rows.push((
            deck.present_slide().name().to_owned(),
            deck.container().class_attr().to_owned(),
        ));
    }
    rows
}
