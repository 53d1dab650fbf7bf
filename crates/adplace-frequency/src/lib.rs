//! Frequency caps and priority selection

pub mod priority;

use std::collections::BTreeSet;

use adplace_core::{Ad, AdId, SessionFrequencyState};

pub use priority::{sort_by_priority, weighted_random};

/// Per-render page cap plus per-visitor session caps
#[derive(Debug, Clone)]
pub struct FrequencyManager {
    /// 0 = unlimited
    max_ads_per_page: u32,
    shown: BTreeSet<AdId>,
    pending: BTreeSet<AdId>,
    state: SessionFrequencyState,
}

impl FrequencyManager {
    pub fn new(max_ads_per_page: u32, state: SessionFrequencyState) -> Self {
        Self {
            max_ads_per_page,
            shown: BTreeSet::new(),
            pending: BTreeSet::new(),
            state,
        }
    }

    /// Distinct ads shown so far in this render
    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    pub fn page_limit_reached(&self) -> bool {
        self.max_ads_per_page > 0 && self.shown.len() >= self.max_ads_per_page as usize
    }

    pub fn can_show(&self, ad: &Ad) -> bool {
        if self.page_limit_reached() {
            return false;
        }
        match ad.effective_session_limit() {
            None => true,
            Some(limit) => self.state.views(ad.id) < limit,
        }
    }

    /// Record an emitted ad. Repeat emissions of one ad count once.
    pub fn track_shown(&mut self, ad: AdId) {
        if self.shown.insert(ad) {
            tracing::debug!(%ad, shown = self.shown.len(), "Ad shown");
        }
        self.pending.insert(ad);
    }

    pub fn session_state(&self) -> &SessionFrequencyState {
        &self.state
    }

    /// Apply queued views and return the merged state to persist.
    ///
    /// Drains the queue: a second flush without new views returns `None`.
    pub fn flush(&mut self) -> Option<SessionFrequencyState> {
        if self.pending.is_empty() {
            return None;
        }
        for ad in std::mem::take(&mut self.pending) {
            self.state.increment(ad);
        }
        Some(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped(id: u64, limit: i64) -> Ad {
        Ad::new(id, "code").with_session_limit(limit)
    }

    #[test]
    fn test_session_limit_boundary() {
        let ad = capped(1, 3);
        let below: SessionFrequencyState = [(AdId(1), 2)].into_iter().collect();
        let at: SessionFrequencyState = [(AdId(1), 3)].into_iter().collect();

        assert!(FrequencyManager::new(0, SessionFrequencyState::new()).can_show(&ad));
        assert!(FrequencyManager::new(0, below).can_show(&ad));
        assert!(!FrequencyManager::new(0, at).can_show(&ad));
    }

    #[test]
    fn test_unlimited_session() {
        let heavy: SessionFrequencyState = [(AdId(1), 10_000)].into_iter().collect();
        let manager = FrequencyManager::new(0, heavy);
        assert!(manager.can_show(&Ad::new(1, "code")));
        assert!(manager.can_show(&capped(1, 0)));
        assert!(manager.can_show(&capped(1, -1)));
    }

    #[test]
    fn test_page_limit_counts_distinct_ads() {
        let mut manager = FrequencyManager::new(2, SessionFrequencyState::new());
        let other = Ad::new(9, "code");

        manager.track_shown(AdId(1));
        manager.track_shown(AdId(1));
        assert!(!manager.page_limit_reached());
        assert!(manager.can_show(&other));

        manager.track_shown(AdId(2));
        assert!(manager.page_limit_reached());
        assert!(!manager.can_show(&other));
    }

    #[test]
    fn test_zero_page_limit_is_unlimited() {
        let mut manager = FrequencyManager::new(0, SessionFrequencyState::new());
        for id in 0..100 {
            manager.track_shown(AdId(id));
        }
        assert!(!manager.page_limit_reached());
    }

    #[test]
    fn test_flush_once_per_ad_and_idempotent() {
        let start: SessionFrequencyState = [(AdId(1), 1)].into_iter().collect();
        let mut manager = FrequencyManager::new(0, start);
        manager.track_shown(AdId(1));
        manager.track_shown(AdId(1));
        manager.track_shown(AdId(2));

        let flushed = manager.flush().unwrap();
        assert_eq!(flushed.views(AdId(1)), 2);
        assert_eq!(flushed.views(AdId(2)), 1);

        assert!(manager.flush().is_none());
        assert_eq!(manager.session_state().views(AdId(1)), 2);
    }

    #[test]
    fn test_flush_without_views() {
        let mut manager = FrequencyManager::new(0, SessionFrequencyState::new());
        assert!(manager.flush().is_none());
    }
}
