//! Per-visitor frequency state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AdId, CoreError, Result};

/// How many times each ad has been shown to one visitor within the session TTL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionFrequencyState {
    counts: BTreeMap<AdId, u32>,
}

impl SessionFrequencyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self, ad: AdId) -> u32 {
        self.counts.get(&ad).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, ad: AdId) {
        let count = self.counts.entry(ad).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Sum another state into this one
    pub fn merge(&mut self, other: &SessionFrequencyState) {
        for (ad, views) in &other.counts {
            let count = self.counts.entry(*ad).or_insert(0);
            *count = count.saturating_add(*views);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdId, u32)> + '_ {
        self.counts.iter().map(|(ad, views)| (*ad, *views))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CoreError::InvalidSessionState(e.to_string()))
    }

    /// Lenient decode of persisted state: blank or corrupt input is an empty map
    pub fn decode(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }
        Self::from_json(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding corrupt session frequency state");
            Self::new()
        })
    }
}

impl FromIterator<(AdId, u32)> for SessionFrequencyState {
    fn from_iter<I: IntoIterator<Item = (AdId, u32)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_merge() {
        let mut state = SessionFrequencyState::new();
        state.increment(AdId(1));
        state.increment(AdId(1));
        assert_eq!(state.views(AdId(1)), 2);
        assert_eq!(state.views(AdId(2)), 0);

        let other: SessionFrequencyState = [(AdId(1), 1), (AdId(2), 3)].into_iter().collect();
        state.merge(&other);
        assert_eq!(state.views(AdId(1)), 3);
        assert_eq!(state.views(AdId(2)), 3);
    }

    #[test]
    fn test_json_encoding() {
        let state: SessionFrequencyState = [(AdId(7), 2)].into_iter().collect();
        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"7":2}"#);
        assert_eq!(SessionFrequencyState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_corrupt_json_is_error() {
        assert!(SessionFrequencyState::from_json("{not json").is_err());
        assert!(SessionFrequencyState::from_json(r#"{"7": -1}"#).is_err());
    }

    #[test]
    fn test_decode_degrades_to_empty() {
        assert!(SessionFrequencyState::decode("%%%").is_empty());
        assert!(SessionFrequencyState::decode("  ").is_empty());
        assert!(SessionFrequencyState::decode(r#"{"7": -1}"#).is_empty());
        assert_eq!(SessionFrequencyState::decode(r#"{"4": 2}"#).views(AdId(4)), 2);
    }
}
