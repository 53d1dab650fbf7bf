//! Placement trait and the host-side vocabulary it binds to

use std::collections::BTreeMap;
use std::fmt;

use adplace_config::HostConfig;
use adplace_core::StreamKind;
use serde::{Deserialize, Serialize};

/// Moments of page generation where the host calls into the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPoint {
    Head,
    Footer,
    ContentFilter,
    WidgetSlot,
    Shortcode,
    ArchiveLoop,
    CommentLoop,
    ForumReplyLoop,
    ActivityLoop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementCategory {
    Standard,
    Content,
    Archive,
    Community,
    Manual,
    Overlay,
}

impl fmt::Display for PlacementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlacementCategory::Standard => "Standard",
            PlacementCategory::Content => "Content",
            PlacementCategory::Archive => "Archive",
            PlacementCategory::Community => "Community",
            PlacementCategory::Manual => "Manual",
            PlacementCategory::Overlay => "Overlay",
        };
        f.write_str(name)
    }
}

/// How many eligible ads one placement opportunity emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Every eligible ad, best first
    All,
    /// One priority-weighted random pick
    One,
}

/// Optional host software a placement may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFeature {
    Comments,
    Widgets,
    Forum,
    Activity,
}

/// What the host site has installed/enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    pub comments: bool,
    pub widgets: bool,
    pub forum: bool,
    pub activity: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            comments: true,
            widgets: true,
            forum: false,
            activity: false,
        }
    }
}

impl From<&HostConfig> for HostCapabilities {
    fn from(host: &HostConfig) -> Self {
        Self {
            comments: host.comments,
            widgets: host.widgets,
            forum: host.forum,
            activity: host.activity,
        }
    }
}

impl HostCapabilities {
    pub fn has(&self, feature: HostFeature) -> bool {
        match feature {
            HostFeature::Comments => self.comments,
            HostFeature::Widgets => self.widgets,
            HostFeature::Forum => self.forum,
            HostFeature::Activity => self.activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Integer { min: u32, default: u32 },
    Bool { default: bool },
}

/// One entry of a placement's configuration schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SettingKind,
}

/// Settings shared by every position-counting placement
pub const COUNTING_SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        key: "after",
        label: "Show after item N",
        kind: SettingKind::Integer { min: 1, default: 1 },
    },
    SettingSpec {
        key: "repeat",
        label: "Repeat every N items",
        kind: SettingKind::Bool { default: false },
    },
];

/// Render points bound to placement tags, in registration order
#[derive(Debug, Clone, Default)]
pub struct HookBindings {
    points: BTreeMap<RenderPoint, Vec<&'static str>>,
}

impl HookBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placement to a render point. Binding twice is a no-op.
    pub fn bind(&mut self, point: RenderPoint, placement: &'static str) -> bool {
        let tags = self.points.entry(point).or_default();
        if tags.contains(&placement) {
            return false;
        }
        tags.push(placement);
        true
    }

    pub fn registered_at(&self, point: RenderPoint) -> &[&'static str] {
        self.points.get(&point).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bound(&self, placement: &str) -> bool {
        self.points
            .values()
            .any(|tags| tags.iter().any(|tag| *tag == placement))
    }
}

/// A named insertion point/strategy
pub trait Placement: Send + Sync {
    fn tag(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn category(&self) -> PlacementCategory;

    fn render_point(&self) -> RenderPoint;

    fn cardinality(&self) -> Cardinality {
        Cardinality::All
    }

    /// Stream counted by this placement, for position-counting placements
    fn stream(&self) -> Option<StreamKind> {
        None
    }

    /// Settings an ad assignment to this placement may carry
    fn settings(&self) -> &'static [SettingSpec] {
        if self.stream().is_some() {
            COUNTING_SETTINGS
        } else {
            &[]
        }
    }

    /// Whether emitted markup is wrapped in a placement container
    fn wraps_output(&self) -> bool {
        true
    }

    fn is_available(&self, _host: &HostCapabilities) -> bool {
        true
    }

    /// Bind to render points. Safe to call more than once.
    fn register(&self, bindings: &mut HookBindings) {
        bindings.bind(self.render_point(), self.tag());
    }
}
