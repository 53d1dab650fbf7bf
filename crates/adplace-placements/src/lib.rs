//! Placement registry for adplace
//!
//! A placement is a named insertion point: where on the page it fires, whether it
//! shows every eligible ad or a single pick, and which settings an ad assigned to
//! it may carry.

pub mod builtin;
pub mod placement;
pub mod registry;

pub use builtin::BuiltinPlacement;
pub use placement::{
    Cardinality, HookBindings, HostCapabilities, HostFeature, Placement, PlacementCategory,
    RenderPoint, SettingKind, SettingSpec,
};
pub use registry::PlacementRegistry;
