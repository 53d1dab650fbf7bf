//! Ad record store seam

use adplace_core::{Ad, AdId};

use crate::{Result, StorageError};

/// Read access to stored ads
pub trait AdStore: Send + Sync {
    /// Enabled ads assigned to a placement, in store order
    fn query_enabled_by_placement(&self, placement: &str) -> Result<Vec<AdId>>;

    fn get_ad(&self, id: AdId) -> Result<Ad>;
}

/// Insertion-ordered in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryAdStore {
    ads: Vec<Ad>,
}

impl MemoryAdStore {
    pub fn new(ads: Vec<Ad>) -> Self {
        Self { ads }
    }

    /// Insert or replace by id. Replacing keeps the original position.
    pub fn insert(&mut self, ad: Ad) {
        match self.ads.iter_mut().find(|existing| existing.id == ad.id) {
            Some(existing) => *existing = ad,
            None => self.ads.push(ad),
        }
    }

    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }
}

impl AdStore for MemoryAdStore {
    fn query_enabled_by_placement(&self, placement: &str) -> Result<Vec<AdId>> {
        Ok(self
            .ads
            .iter()
            .filter(|ad| ad.enabled && ad.assignment(placement).is_some())
            .map(|ad| ad.id)
            .collect())
    }

    fn get_ad(&self, id: AdId) -> Result<Ad> {
        self.ads
            .iter()
            .find(|ad| ad.id == id)
            .cloned()
            .ok_or(StorageError::AdNotFound(id))
    }
}
