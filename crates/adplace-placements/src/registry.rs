use std::collections::BTreeMap;
use std::sync::Arc;

use adplace_core::StreamKind;

use crate::builtin::BUILTIN;
use crate::placement::{HookBindings, HostCapabilities, Placement, PlacementCategory};

/// Maps placement tags to placements, keeping registration order
#[derive(Clone, Default)]
pub struct PlacementRegistry {
    placements: Vec<Arc<dyn Placement>>,
}

impl PlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in placement
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for placement in BUILTIN {
            registry.register(*placement);
        }
        registry
    }

    /// Register a placement, replacing one with the same tag in place
    pub fn register<P: Placement + 'static>(&mut self, placement: P) {
        let placement: Arc<dyn Placement> = Arc::new(placement);
        match self.placements.iter_mut().find(|p| p.tag() == placement.tag()) {
            Some(existing) => {
                tracing::debug!(placement = placement.tag(), "Replacing registered placement");
                *existing = placement;
            }
            None => self.placements.push(placement),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&dyn Placement> {
        self.placements
            .iter()
            .find(|p| p.tag() == tag)
            .map(|p| p.as_ref())
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Placement> {
        self.placements.iter().map(|p| p.as_ref())
    }

    /// Placements usable on this host (what the admin may select)
    pub fn available<'a>(&'a self, host: &'a HostCapabilities) -> impl Iterator<Item = &'a dyn Placement> {
        self.all().filter(move |p| p.is_available(host))
    }

    pub fn grouped_by_category(&self) -> BTreeMap<PlacementCategory, Vec<&dyn Placement>> {
        let mut groups: BTreeMap<PlacementCategory, Vec<&dyn Placement>> = BTreeMap::new();
        for placement in self.all() {
            groups.entry(placement.category()).or_default().push(placement);
        }
        groups
    }

    /// Counting placements that consume the given stream
    pub fn for_stream(&self, kind: StreamKind) -> impl Iterator<Item = &dyn Placement> {
        self.all().filter(move |p| p.stream() == Some(kind))
    }

    /// Bind every available placement to its render points
    pub fn bind_available(&self, host: &HostCapabilities, bindings: &mut HookBindings) {
        for placement in self.all() {
            if placement.is_available(host) {
                placement.register(bindings);
            } else {
                tracing::debug!(placement = placement.tag(), "Placement unavailable on this host");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{self, BuiltinPlacement};
    use crate::placement::{Cardinality, RenderPoint};

    #[test]
    fn test_builtin_registry() {
        let registry = PlacementRegistry::with_builtin();
        assert_eq!(registry.all().count(), BUILTIN.len());
        assert!(registry.get(builtin::AFTER_PARAGRAPH).is_some());
        assert!(registry.get("nowhere").is_none());
    }

    #[test]
    fn test_grouped_by_category() {
        let registry = PlacementRegistry::with_builtin();
        let groups = registry.grouped_by_category();

        let content: Vec<&str> = groups[&PlacementCategory::Content].iter().map(|p| p.tag()).collect();
        assert_eq!(content, vec!["before_content", "after_content", "after_paragraph"]);
        assert_eq!(groups[&PlacementCategory::Overlay].len(), 2);
    }

    #[test]
    fn test_for_stream() {
        let registry = PlacementRegistry::with_builtin();
        let tags: Vec<&str> = registry.for_stream(StreamKind::Comment).map(|p| p.tag()).collect();
        assert_eq!(tags, vec![builtin::BETWEEN_COMMENTS]);
    }

    #[test]
    fn test_bind_available_skips_missing_host_features() {
        let registry = PlacementRegistry::with_builtin();
        let host = HostCapabilities::default();
        let mut bindings = HookBindings::new();

        registry.bind_available(&host, &mut bindings);
        registry.bind_available(&host, &mut bindings);

        assert_eq!(bindings.registered_at(RenderPoint::Footer), &["footer", "popup", "sticky_footer"]);
        assert!(bindings.registered_at(RenderPoint::ForumReplyLoop).is_empty());
        assert!(!bindings.is_bound(builtin::ACTIVITY_BETWEEN_ENTRIES));
        assert_eq!(registry.available(&host).count(), BUILTIN.len() - 2);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = PlacementRegistry::with_builtin();
        let mut footer: BuiltinPlacement = *BUILTIN.iter().find(|p| p.tag == builtin::FOOTER).unwrap();
        footer.cardinality = Cardinality::One;
        registry.register(footer);

        assert_eq!(registry.all().count(), BUILTIN.len());
        assert_eq!(registry.get(builtin::FOOTER).unwrap().cardinality(), Cardinality::One);
        assert_eq!(registry.all().nth(1).unwrap().tag(), builtin::FOOTER);
    }
}
