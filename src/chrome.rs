//! The presentation chrome bound to the host deck.
//!
//! Reacts to deck lifecycle events: mirrors the present slide's `slide--*`
//! tokens onto the container as `layout--*` tokens, and pins slides to the
//! top of the viewport against the host's centering layout. Extension
//! callbacks registered on the chrome run once when the deck becomes ready.

use tracing::debug;

use crate::classes::sync_state_classes;
use crate::deck::Deck;
use crate::element::{ClassList, Positioned};
use crate::events::DeckEvent;

/// Mirror `slide`'s tokens onto `container` per the state-class rules.
///
/// Works over any [`ClassList`] implementation; the whole class attribute is
/// replaced, not patched.
pub fn synchronize<C, S>(container: &mut C, slide: &S)
where
    C: ClassList + ?Sized,
    S: ClassList + ?Sized,
{
    let next = sync_state_classes(&container.classes(), &slide.classes());
    container.set_classes(&next);
}

/// Cancel the host's vertical positioning of `slide`.
pub fn force_full_screen<E>(slide: &mut E)
where
    E: Positioned + ?Sized,
{
    slide.set_top_px(0.0);
}

type Extension = Box<dyn FnMut(&mut Deck) + Send>;

/// Event-driven controller owning the container's `layout--*` state.
#[derive(Default)]
pub struct Chrome {
    extensions: Vec<Extension>,
}

impl Chrome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback run once when the deck becomes ready. Nothing is
    /// registered by default; this is the seam custom behavior plugs into.
    pub fn install_extension(&mut self, extension: impl FnMut(&mut Deck) + Send + 'static) {
        self.extensions.push(Box::new(extension));
    }

    pub fn handle_event(&mut self, deck: &mut Deck, event: DeckEvent) {
        match event {
            DeckEvent::Ready { current } => {
                self.apply(deck, None, current);
                for extension in &mut self.extensions {
                    extension(deck);
                }
            }
            DeckEvent::SlideChanged { previous, current } => {
                self.apply(deck, previous, current);
            }
        }
    }

    /// Re-pin the present slide after a (throttled) viewport resize relaid
    /// out the deck.
    pub fn handle_resize(&mut self, deck: &mut Deck) {
        let present = deck.present_index();
        force_full_screen(deck.slide_mut(present).element_mut());
    }

    fn apply(&mut self, deck: &mut Deck, previous: Option<usize>, current: usize) {
        Self::sync_container(deck, current);
        force_full_screen(deck.slide_mut(current).element_mut());
        if let Some(prev) = previous {
            if prev < deck.slide_count() {
                force_full_screen(deck.slide_mut(prev).element_mut());
            }
        }
        debug!(
            slide = %deck.slide(current).name(),
            container = deck.container().class_attr(),
            "container state synchronized"
        );
    }

    fn sync_container(deck: &mut Deck, current: usize) {
        let slide_tokens = deck.slide(current).element().classes();
        let container_tokens = deck.container().classes();
        let next = sync_state_classes(&container_tokens, &slide_tokens);
        deck.container_mut().set_classes(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeckFile, DeckOptions, SlideConfig};
    use crate::deck::HookRegistry;
    use crate::element::Element;
    use crate::events::Viewport;

    fn deck_with(slides: &[(&str, &[&str])]) -> Deck {
        let file = DeckFile {
            slides: slides
                .iter()
                .map(|(name, classes)| SlideConfig {
                    name: (*name).to_owned(),
                    classes: classes.iter().map(|s| (*s).to_owned()).collect(),
                })
                .collect(),
        };
        Deck::initialize(
            DeckOptions::default(),
            &file,
            Viewport::new(1368, 768),
            &HookRegistry::new(),
        )
    }

    #[test]
    fn synchronize_rewrites_any_class_list_impl() {
        let mut container = Element::new("slides layout--title");
        let slide = Element::new("slide--title slide--dark");
        synchronize(&mut container, &slide);
        assert_eq!(container.class_attr(), "slides layout--title layout--dark");
    }

    #[test]
    fn force_full_screen_zeroes_the_offset() {
        let mut slide = Element::new("slide--wide");
        slide.set_top_px(320.0);
        force_full_screen(&mut slide);
        assert_eq!(slide.top_px(), 0.0);
    }

    #[test]
    fn ready_synchronizes_and_pins_the_first_slide() {
        let mut deck = deck_with(&[("title", &["slide--title", "slide--dark"]), ("plain", &[])]);
        let mut chrome = Chrome::new();

        // Tall viewport so centering leaves a nonzero offset to undo.
        deck.resize(Viewport::new(1368, 2000));
        assert!(deck.present_slide().element().top_px() > 0.0);

        let ready = deck.ready();
        chrome.handle_event(&mut deck, ready);

        assert_eq!(
            deck.container().class_attr(),
            "slides layout--title layout--dark"
        );
        assert_eq!(deck.present_slide().element().top_px(), 0.0);
    }

    #[test]
    fn slide_change_pins_both_current_and_previous() {
        let mut deck = deck_with(&[("a", &["slide--one"]), ("b", &["slide--two"])]);
        let mut chrome = Chrome::new();
        deck.resize(Viewport::new(1368, 2000));

        let event = deck.next().unwrap();
        chrome.handle_event(&mut deck, event);

        assert_eq!(deck.container().class_attr(), "slides layout--two");
        assert_eq!(deck.slide(0).element().top_px(), 0.0);
        assert_eq!(deck.slide(1).element().top_px(), 0.0);
    }

    #[test]
    fn foreign_layout_tokens_are_dropped_on_the_next_pass() {
        let mut deck = deck_with(&[("a", &["slide--one"]), ("b", &[])]);
        let mut chrome = Chrome::new();
        let ready = deck.ready();
        chrome.handle_event(&mut deck, ready);

        // Something else decorates the container between transitions.
        let mut tokens = deck.container().classes();
        tokens.push("layout--injected".to_owned());
        tokens.push("unrelated".to_owned());
        deck.container_mut().set_classes(&tokens);

        let event = deck.next().unwrap();
        chrome.handle_event(&mut deck, event);

        assert_eq!(deck.container().class_attr(), "slides unrelated");
    }

    #[test]
    fn resize_pass_only_pins_the_present_slide() {
        let mut deck = deck_with(&[("a", &[]), ("b", &[])]);
        let mut chrome = Chrome::new();
        deck.resize(Viewport::new(1368, 2000));

        chrome.handle_resize(&mut deck);

        assert_eq!(deck.present_slide().element().top_px(), 0.0);
        assert!(deck.slide(1).element().top_px() > 0.0);
    }

    #[test]
    fn extensions_run_once_at_ready() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut deck = deck_with(&[("a", &[]), ("b", &[])]);
        let mut chrome = Chrome::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        chrome.install_extension(move |_deck: &mut Deck| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let ready = deck.ready();
        chrome.handle_event(&mut deck, ready);
        let event = deck.next().unwrap();
        chrome.handle_event(&mut deck, event);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeated_events_for_the_same_slide_are_stable() {
        let mut deck = deck_with(&[("a", &["slide--solo"])]);
        let mut chrome = Chrome::new();
        let ready = deck.ready();
        chrome.handle_event(&mut deck, ready);
        let first = deck.container().class_attr().to_owned();
        let ready_again = DeckEvent::Ready { current: 0 };
        chrome.handle_event(&mut deck, ready_again);
        assert_eq!(deck.container().class_attr(), first);
    }
}
