//! YAML configuration: chrome settings, deck options, and the deck
//! definition file.
//!
//! Field names are kebab-case and unknown keys are rejected so typos surface
//! at load time instead of silently falling back to defaults. Defaults match
//! the values the deck was authored against: a 1368x768 design surface scaled
//! between 0.8x and 2.0x, fade transitions, centered slides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::events::Viewport;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// Deck definition file listing the slides in order.
    pub deck_path: PathBuf,
    /// Host deck options applied at initialization.
    #[serde(default)]
    pub deck: DeckOptions,
    /// Viewport assumed before the first resize arrives.
    #[serde(default = "Configuration::default_initial_viewport")]
    pub initial_viewport: ViewportConfig,
    /// Resize handling window: at most one layout pass per window, with the
    /// latest suppressed resize applied at the window edge.
    #[serde(
        default = "Configuration::default_resize_throttle",
        with = "humantime_serde"
    )]
    pub resize_throttle: Duration,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl From<ViewportConfig> for Viewport {
    fn from(value: ViewportConfig) -> Self {
        Self::new(value.width, value.height)
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing configuration file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.initial_viewport.width > 0 && self.initial_viewport.height > 0,
            "initial-viewport must be non-zero in both dimensions"
        );
        ensure!(
            self.resize_throttle > Duration::ZERO,
            "resize-throttle must be a positive duration"
        );
        self.deck.validate()?;
        Ok(self)
    }

    fn default_initial_viewport() -> ViewportConfig {
        ViewportConfig {
            width: 1368,
            height: 768,
        }
    }

    const fn default_resize_throttle() -> Duration {
        Duration::from_millis(500)
    }
}

/// Options the host deck is initialized with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DeckOptions {
    /// Design width of a slide, in pixels.
    pub width: u32,
    /// Design height of a slide, in pixels.
    pub height: u32,
    /// Fraction of the viewport kept empty around the scaled deck.
    pub margin: f32,
    /// Lower bound on the computed deck scale.
    pub min_scale: f32,
    /// Upper bound on the computed deck scale.
    pub max_scale: f32,
    /// Whether interactive navigation commands are accepted.
    pub controls: bool,
    /// Whether navigation logs include deck progress.
    pub progress: bool,
    /// Whether visited slides are recorded for the `back` command.
    pub history: bool,
    /// Whether the layout pass vertically centers slides in the viewport.
    pub center: bool,
    /// Transition style between slides.
    pub transition: Transition,
    /// Advance to the next slide automatically at this interval.
    #[serde(with = "humantime_serde")]
    pub auto_advance: Option<Duration>,
    /// Optional add-ons resolved at initialization.
    pub add_ons: Vec<AddOn>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            width: 1368,
            height: 768,
            margin: 0.0,
            min_scale: 0.8,
            max_scale: 2.0,
            controls: false,
            progress: true,
            history: true,
            center: true,
            transition: Transition::Fade,
            auto_advance: None,
            add_ons: Vec::new(),
        }
    }
}

impl DeckOptions {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "deck width and height must be non-zero"
        );
        ensure!(
            (0.0..1.0).contains(&self.margin),
            "deck margin must lie in [0, 1), got {}",
            self.margin
        );
        ensure!(
            self.min_scale > 0.0,
            "min-scale must be positive, got {}",
            self.min_scale
        );
        ensure!(
            self.min_scale <= self.max_scale,
            "min-scale {} exceeds max-scale {}",
            self.min_scale,
            self.max_scale
        );
        if let Some(interval) = self.auto_advance {
            ensure!(
                interval > Duration::ZERO,
                "auto-advance must be a positive duration"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    None,
    #[default]
    Fade,
    Slide,
}

impl Transition {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::Slide => "slide",
        }
    }
}

/// An optional component loaded while the deck initializes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AddOn {
    /// Name of the component; doubles as the capability it provides.
    pub src: String,
    /// Condition gating the load.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub when: AddOnCondition,
    /// Named hook from the registry to run after a successful load.
    #[serde(default)]
    pub after_load: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddOnCondition {
    /// Load unconditionally.
    #[default]
    Always,
    /// Load only while the deck lacks the named capability.
    MissingCapability(String),
}

/// The deck definition file: an ordered list of slides.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeckFile {
    pub slides: Vec<SlideConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SlideConfig {
    /// Stable name used in logs and the walkthrough report.
    pub name: String,
    /// Class tokens carried by the slide element.
    #[serde(default)]
    pub classes: Vec<String>,
}

impl DeckFile {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading deck file {}", path.display()))?;
        let deck: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing deck file {}", path.display()))?;
        Ok(deck)
    }

    pub fn validated(self) -> Result<Self> {
        ensure!(!self.slides.is_empty(), "deck file defines no slides");
        for (idx, slide) in self.slides.iter().enumerate() {
            ensure!(
                !slide.name.trim().is_empty(),
                "slide {idx} has an empty name"
            );
            for token in &slide.classes {
                ensure!(
                    !token.is_empty() && !token.chars().any(char::is_whitespace),
                    "slide '{}' carries an invalid class token {token:?}",
                    slide.name
                );
            }
        }
        for (idx, slide) in self.slides.iter().enumerate() {
            if let Some(dup) = self.slides[..idx].iter().find(|s| s.name == slide.name) {
                anyhow::bail!("duplicate slide name '{}'", dup.name);
            }
        }
        Ok(self)
    }
}
