//! End-to-end pass over a configured deck: initialization, walkthrough,
//! resize, and live reload, observed through the container's class attribute.

use deck_chrome::chrome::{self, Chrome};
use deck_chrome::config::{Configuration, DeckFile};
use deck_chrome::deck::{Deck, HookRegistry};
use deck_chrome::element::{ClassList, Positioned};
use deck_chrome::events::Viewport;
use deck_chrome::runner;

fn configuration() -> Configuration {
    let yaml = r#"
deck-path: "talk.yaml"
deck:
  add-ons:
    - src: class-list
      when:
        missing-capability: class-list
    - src: highlighter
      after-load: highlight-code
"#;
    serde_yaml::from_str::<Configuration>(yaml)
        .unwrap()
        .validated()
        .unwrap()
}

fn deck_file() -> DeckFile {
    let yaml = r#"
slides:
  - name: title
    classes: [slide--title, slide--dark]
  - name: agenda
    classes: [slide--list]
  - name: demo
  - name: outro
    classes: [slide--dark]
"#;
    serde_yaml::from_str::<DeckFile>(yaml)
        .unwrap()
        .validated()
        .unwrap()
}

fn build() -> (Deck, Chrome) {
    let cfg = configuration();
    let mut hooks = HookRegistry::new();
    hooks.register("highlight-code", |deck: &mut Deck| {
        deck.grant_capability("code-highlighting");
    });
    let deck = Deck::initialize(
        cfg.deck.clone(),
        &deck_file(),
        cfg.initial_viewport.into(),
        &hooks,
    );
    (deck, Chrome::new())
}

#[test]
fn walkthrough_reports_the_container_state_per_slide() {
    let (mut deck, mut chrome) = build();
    let rows = runner::walkthrough(&mut deck, &mut chrome);
    let rows: Vec<(&str, &str)> = rows
        .iter()
        .map(|(name, classes)| (name.as_str(), classes.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("title", "slides layout--title layout--dark"),
            ("agenda", "slides layout--list"),
            ("demo", "slides"),
            ("outro", "slides layout--dark"),
        ]
    );
}

#[test]
fn add_ons_resolved_during_initialization() {
    let (deck, _) = build();
    assert!(deck.has_capability("class-list"));
    assert!(deck.has_capability("highlighter"));
    assert!(deck.has_capability("code-highlighting"));
}

#[test]
fn resize_recenters_and_the_chrome_pins_the_present_slide() {
    let (mut deck, mut chrome) = build();
    let ready = deck.ready();
    chrome.handle_event(&mut deck, ready);
    assert_eq!(deck.present_slide().element().top_px(), 0.0);

    // A much taller viewport: the host recenters every slide.
    deck.resize(Viewport::new(1368, 2400));
    assert!(deck.present_slide().element().top_px() > 0.0);

    chrome.handle_resize(&mut deck);
    assert_eq!(deck.present_slide().element().top_px(), 0.0);
    assert!(deck.slide(1).element().top_px() > 0.0);
}

#[test]
fn reload_resynchronizes_the_container() {
    let (mut deck, mut chrome) = build();
    let ready = deck.ready();
    chrome.handle_event(&mut deck, ready);
    if let Some(event) = deck.go_to(3) {
        chrome.handle_event(&mut deck, event);
    }
    assert_eq!(deck.container().class_attr(), "slides layout--dark");

    let smaller: DeckFile = serde_yaml::from_str(
        r#"
slides:
  - name: solo
    classes: [slide--wide]
"#,
    )
    .unwrap();
    let event = deck.reload(&smaller.validated().unwrap());
    chrome.handle_event(&mut deck, event);

    assert_eq!(deck.present_index(), 0);
    assert_eq!(deck.container().class_attr(), "slides layout--wide");
}

#[test]
fn synchronize_is_reusable_outside_the_deck() {
    use deck_chrome::element::Element;

    let mut container = Element::new("slides theme-default layout--stale");
    let slide = Element::new("slide--quote plain");
    chrome::synchronize(&mut container, &slide);
    assert_eq!(container.class_attr(), "slides theme-default layout--quote");
}
