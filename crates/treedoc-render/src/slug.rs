//! Heading anchors.

use std::collections::HashMap;

/// Generates unique GitHub-style heading anchors.
///
/// Repeated slugs get a `-N` suffix in order of appearance.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Create an empty slugger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for the next heading with `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_default();
        let slug = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        slug
    }
}

/// Convert heading text to an anchor the way GitHub does.
///
/// Lowercases, turns spaces into dashes, keeps letters, digits, `-` and `_`,
/// and drops everything else. Runs of dashes are not collapsed.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
        } else if c == ' ' || c == '-' {
            result.push('-');
        } else if c == '_' {
            result.push('_');
        }
    }
    result
}
