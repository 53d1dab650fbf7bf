//! Render-time options and per-page asset collection

use std::collections::BTreeSet;

/// Options passed to an ad type handler for one render
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Placement the ad is rendered for, if any
    pub placement: Option<String>,
    /// CSS class prefix for handler-generated markup
    pub class_prefix: String,
}

impl RenderOptions {
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            placement: None,
            class_prefix: class_prefix.into(),
        }
    }

    pub fn for_placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = Some(placement.into());
        self
    }

    /// `{prefix}-{suffix}`, or just the suffix without a prefix
    pub fn class(&self, suffix: &str) -> String {
        if self.class_prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}-{}", self.class_prefix, suffix)
        }
    }
}

/// Supporting scripts requested by handlers during one page render.
///
/// Each key is emitted at most once per page regardless of how many ads ask for it.
#[derive(Debug, Default)]
pub struct PageAssets {
    keys: BTreeSet<String>,
    pending: Vec<String>,
}

impl PageAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue markup under `key`. Returns false if the key was already queued.
    pub fn enqueue(&mut self, key: &str, markup: impl Into<String>) -> bool {
        if !self.keys.insert(key.to_string()) {
            return false;
        }
        self.pending.push(markup.into());
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Take queued markup for emission. Keys stay marked as emitted.
    pub fn drain(&mut self) -> String {
        self.pending.drain(..).collect::<Vec<_>>().join("\n")
    }
}
