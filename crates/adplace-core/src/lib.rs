//! Core domain models for adplace
//!
//! This crate contains:
//! - Domain models (Ad, PlacementAssignment, targeting rules)
//! - The per-request context the engine decides against
//! - Session frequency state and render-time helpers

pub mod ad;
pub mod context;
pub mod error;
pub mod render;
pub mod rules;
pub mod session;

pub use ad::{Ad, AdId, PlacementAssignment, Priority};
pub use context::{CountryCode, DeviceClass, PageContext, PageType, RequestContext, StreamKind};
pub use error::{CoreError, Result};
pub use render::{PageAssets, RenderOptions};
pub use rules::{
    DayOfWeek, DisplayRule, GeoMode, GeoRule, Schedule, TaxonomyFilter, UserStatus,
    VisitorConditions,
};
pub use session::SessionFrequencyState;
