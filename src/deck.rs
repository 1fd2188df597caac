//! Minimal in-process host deck.
//!
//! Owns the slide container and the slide elements, tracks which slide is
//! present, emits lifecycle events, and runs the layout pass that scales the
//! deck and (when enabled) vertically centers every slide in the viewport.
//! The chrome consumes these events and deliberately undoes the centering for
//! the present slide.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::config::{AddOnCondition, DeckFile, DeckOptions, SlideConfig};
use crate::element::{Element, Positioned};
use crate::events::{DeckEvent, Viewport};

/// One slide: a stable name plus the element carrying its class tokens.
#[derive(Debug, Clone)]
pub struct Slide {
    name: String,
    element: Element,
}

impl Slide {
    fn from_config(cfg: &SlideConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            element: Element::new(cfg.classes.join(" ")),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }
}

type Hook = Box<dyn Fn(&mut Deck) + Send + Sync>;

/// Named post-load hooks add-ons may reference from configuration.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Hook>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, hook: impl Fn(&mut Deck) + Send + Sync + 'static) {
        self.hooks.insert(name.into(), Box::new(hook));
    }

    fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }
}

pub struct Deck {
    options: DeckOptions,
    container: Element,
    slides: Vec<Slide>,
    present: usize,
    trail: Vec<usize>,
    capabilities: BTreeSet<String>,
    viewport: Viewport,
    scale: f32,
}

impl Deck {
    /// Build the deck from its options and definition, run the first layout
    /// pass, and resolve add-ons against `hooks`.
    ///
    /// The definition must have passed [`DeckFile::validated`]: the deck
    /// assumes at least one slide exists.
    #[must_use]
    pub fn initialize(
        options: DeckOptions,
        file: &DeckFile,
        viewport: Viewport,
        hooks: &HookRegistry,
    ) -> Self {
        let mut deck = Self {
            options,
            container: Element::new("slides"),
            slides: file.slides.iter().map(Slide::from_config).collect(),
            present: 0,
            trail: Vec::new(),
            capabilities: BTreeSet::new(),
            viewport,
            scale: 1.0,
        };
        deck.layout();
        deck.load_add_ons(hooks);
        deck
    }

    /// Announce the deck ready with its first slide present.
    pub fn ready(&mut self) -> DeckEvent {
        info!(
            slides = self.slides.len(),
            scale = self.scale,
            transition = self.options.transition.as_str(),
            "deck ready"
        );
        DeckEvent::Ready {
            current: self.present,
        }
    }

    #[must_use]
    pub fn options(&self) -> &DeckOptions {
        &self.options
    }

    #[must_use]
    pub fn container(&self) -> &Element {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Element {
        &mut self.container
    }

    #[must_use]
    pub fn slide(&self, index: usize) -> &Slide {
        &self.slides[index]
    }

    pub fn slide_mut(&mut self, index: usize) -> &mut Slide {
        &mut self.slides[index]
    }

    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn present_index(&self) -> usize {
        self.present
    }

    #[must_use]
    pub fn present_slide(&self) -> &Slide {
        &self.slides[self.present]
    }

    /// Fraction of the deck already visited, 0.0 at the first slide and 1.0
    /// at the last.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.slides.len() <= 1 {
            1.0
        } else {
            self.present as f32 / (self.slides.len() - 1) as f32
        }
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    /// Record a capability, typically from an add-on hook.
    pub fn grant_capability(&mut self, name: impl Into<String>) {
        self.capabilities.insert(name.into());
    }

    pub fn next(&mut self) -> Option<DeckEvent> {
        if self.present + 1 >= self.slides.len() {
            return None;
        }
        self.transition_to(self.present + 1, true)
    }

    pub fn previous(&mut self) -> Option<DeckEvent> {
        if self.present == 0 {
            return None;
        }
        self.transition_to(self.present - 1, true)
    }

    pub fn go_to(&mut self, index: usize) -> Option<DeckEvent> {
        if index >= self.slides.len() {
            warn!(index, slides = self.slides.len(), "slide index out of range");
            return None;
        }
        self.transition_to(index, true)
    }

    /// Revisit the most recently recorded slide. No-op unless the deck was
    /// initialized with `history` on and a visit is recorded.
    pub fn back(&mut self) -> Option<DeckEvent> {
        if !self.options.history {
            return None;
        }
        let target = self.trail.pop()?;
        self.transition_to(target, false)
    }

    fn transition_to(&mut self, index: usize, record: bool) -> Option<DeckEvent> {
        if index == self.present {
            return None;
        }
        let previous = self.present;
        if record && self.options.history {
            self.trail.push(previous);
        }
        self.present = index;
        debug!(
            from = %self.slides[previous].name(),
            to = %self.slides[index].name(),
            transition = self.options.transition.as_str(),
            "slide changed"
        );
        Some(DeckEvent::SlideChanged {
            previous: Some(previous),
            current: index,
        })
    }

    /// Adopt a new viewport and rerun the layout pass.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.layout();
        debug!(
            width = viewport.width,
            height = viewport.height,
            scale = self.scale,
            "viewport resized"
        );
    }

    /// Replace the slide list from a reloaded definition, keeping the
    /// container element (and therefore its class attribute) intact.
    pub fn reload(&mut self, file: &DeckFile) -> DeckEvent {
        self.slides = file.slides.iter().map(Slide::from_config).collect();
        if self.present >= self.slides.len() {
            self.present = self.slides.len() - 1;
        }
        self.trail.retain(|&idx| idx < self.slides.len());
        self.layout();
        info!(slides = self.slides.len(), "deck reloaded");
        DeckEvent::SlideChanged {
            previous: None,
            current: self.present,
        }
    }

    /// Scale the deck to the viewport and, with `center` on, assign every
    /// slide the vertical offset that centers it.
    fn layout(&mut self) {
        let usable_width = self.viewport.width as f32 * (1.0 - self.options.margin);
        let usable_height = self.viewport.height as f32 * (1.0 - self.options.margin);
        let fit = (usable_width / self.options.width as f32)
            .min(usable_height / self.options.height as f32);
        self.scale = fit.clamp(self.options.min_scale, self.options.max_scale);

        let top = if self.options.center {
            (((self.viewport.height as f32 / self.scale) - self.options.height as f32) / 2.0)
                .max(0.0)
        } else {
            0.0
        };
        for slide in &mut self.slides {
            slide.element.set_top_px(top);
        }
    }

    fn load_add_ons(&mut self, hooks: &HookRegistry) {
        for add_on in self.options.add_ons.clone() {
            let wanted = match &add_on.when {
                AddOnCondition::Always => true,
                AddOnCondition::MissingCapability(cap) => !self.capabilities.contains(cap),
            };
            if !wanted {
                debug!(src = %add_on.src, "add-on skipped, capability already present");
                continue;
            }
            self.capabilities.insert(add_on.src.clone());
            info!(src = %add_on.src, "add-on loaded");
            if let Some(name) = &add_on.after_load {
                match hooks.get(name) {
                    Some(hook) => hook(self),
                    None => warn!(hook = %name, src = %add_on.src, "unknown after-load hook"),
                }
            }
        }
    }
}
