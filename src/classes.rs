//! Class-token algebra for the slide container.
//!
//! The container carries three kinds of tokens: opaque ones we never touch,
//! `layout--*` tokens owned exclusively by this module, and (on slides)
//! `slide--*` tokens that act as the source data. Synchronization rewrites the
//! container so its `layout--*` set mirrors the present slide's `slide--*`
//! set while every other token survives in its original relative order.

/// Prefix of the source tokens carried by individual slides.
pub const SLIDE_PREFIX: &str = "slide--";

/// Prefix of the derived tokens owned by the synchronizer on the container.
pub const LAYOUT_PREFIX: &str = "layout--";

/// Split a class attribute into its ordered tokens.
///
/// Runs of whitespace collapse; an empty or blank attribute yields no tokens.
#[must_use]
pub fn split_class_attr(attr: &str) -> Vec<String> {
    attr.split_whitespace().map(str::to_owned).collect()
}

/// Join tokens back into a class attribute separated by single spaces.
#[must_use]
pub fn join_class_attr(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// Recompute the container token sequence for the present slide.
///
/// Every `layout--*` token is dropped from `container` regardless of origin,
/// then each `slide--<name>` token on `slide` is appended as `layout--<name>`
/// in slide-attribute order. Duplicates resolve to the first occurrence, so
/// the result never repeats a token. Calling this twice with the same inputs
/// yields the same sequence.
#[must_use]
pub fn sync_state_classes(container: &[String], slide: &[String]) -> Vec<String> {
    let mut out: Vec<String> = container
        .iter()
        .filter(|token| !token.starts_with(LAYOUT_PREFIX))
        .cloned()
        .collect();

    for token in slide {
        if let Some(name) = token.strip_prefix(SLIDE_PREFIX) {
            out.push(format!("{LAYOUT_PREFIX}{name}"));
        }
    }

    dedup_preserving_order(&mut out);
    out
}

fn dedup_preserving_order(tokens: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(tokens.len());
    tokens.retain(|token| {
        if seen.iter().any(|s| s == token) {
            false
        } else {
            seen.push(token.clone());
            true
        }
    });
}
