use std::collections::BTreeSet;

use adplace_core::{AdId, PlacementAssignment, StreamKind};

/// `(after, repeat)` policy of one ad on one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountingRule {
    pub ad: AdId,
    /// Always >= 1
    pub after: u32,
    pub repeat: bool,
}

impl CountingRule {
    pub fn new(ad: AdId, after: u32, repeat: bool) -> Self {
        Self {
            ad,
            after: after.max(1),
            repeat,
        }
    }

    pub fn from_assignment(ad: AdId, assignment: &PlacementAssignment) -> Self {
        Self::new(ad, assignment.position(), assignment.repeat)
    }

    /// Whether the policy matches position `n`, ignoring "already shown"
    pub fn matches(&self, n: u32) -> bool {
        if self.repeat {
            n >= self.after && n % self.after == 0
        } else {
            n == self.after
        }
    }
}

/// Running position within one stream occurrence
#[derive(Debug, Clone)]
pub struct StreamCounter {
    kind: StreamKind,
    position: u32,
    shown_once: BTreeSet<AdId>,
}

impl StreamCounter {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            position: 0,
            shown_once: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Items counted so far
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Replay the same stream from the start. Non-repeating ads already shown
    /// stay shown.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Count one item and return the ads that fire after it, in rule order
    pub fn advance(&mut self, rules: &[CountingRule]) -> Vec<AdId> {
        self.position = self.position.saturating_add(1);
        let n = self.position;

        let mut fired = Vec::new();
        for rule in rules {
            if !rule.matches(n) {
                continue;
            }
            if !rule.repeat && !self.shown_once.insert(rule.ad) {
                continue;
            }
            fired.push(rule.ad);
        }
        if !fired.is_empty() {
            tracing::debug!(stream = %self.kind, position = n, count = fired.len(), "Stream position fired");
        }
        fired
    }
}
