//! Ad domain model

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rules::{DisplayRule, GeoRule, Schedule, VisitorConditions};

/// Stable identity of an ad in the ad store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(pub u64);

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AdId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Ad priority, always within `[1, 10]`. Higher is shown first and weighted more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(1);
    pub const MAX: Priority = Priority(10);
    pub const DEFAULT: Priority = Priority(5);

    /// Clamp any stored value into range
    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Weight of this ad in a weighted-random draw
    pub fn weight(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

/// Binding of an ad to one placement, with placement-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementAssignment {
    pub placement: String,

    /// Position for counting placements ("after item N")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<u32>,

    /// Repeat every `after` items instead of once
    #[serde(default)]
    pub repeat: bool,

    /// Any other placement-specific settings
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl PlacementAssignment {
    pub fn new(placement: impl Into<String>) -> Self {
        Self {
            placement: placement.into(),
            after: None,
            repeat: false,
            options: Map::new(),
        }
    }

    pub fn counting(placement: impl Into<String>, after: u32, repeat: bool) -> Self {
        Self {
            after: Some(after),
            repeat,
            ..Self::new(placement)
        }
    }

    /// `after` normalized for counting: missing or zero means 1
    pub fn position(&self) -> u32 {
        self.after.unwrap_or(1).max(1)
    }
}

/// A configured content unit with a type, targeting rules and placements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,

    #[serde(default)]
    pub title: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub priority: Priority,

    /// Max views per visitor session. `None` or `<= 0` is unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_limit: Option<i64>,

    pub ad_type: String,

    #[serde(default)]
    pub payload: Map<String, Value>,

    #[serde(default)]
    pub placements: Vec<PlacementAssignment>,

    #[serde(default)]
    pub display: DisplayRule,

    #[serde(default)]
    pub schedule: Schedule,

    #[serde(default)]
    pub visitor: VisitorConditions,

    #[serde(default)]
    pub geo: GeoRule,
}

fn default_enabled() -> bool {
    true
}

impl Ad {
    pub fn new(id: impl Into<AdId>, ad_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            enabled: true,
            priority: Priority::default(),
            session_limit: None,
            ad_type: ad_type.into(),
            payload: Map::new(),
            placements: Vec::new(),
            display: DisplayRule::default(),
            schedule: Schedule::default(),
            visitor: VisitorConditions::default(),
            geo: GeoRule::default(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Priority::new(priority);
        self
    }

    pub fn with_session_limit(mut self, limit: i64) -> Self {
        self.session_limit = Some(limit);
        self
    }

    pub fn with_placement(mut self, assignment: PlacementAssignment) -> Self {
        self.placements.push(assignment);
        self
    }

    pub fn with_payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Assignment of this ad to the given placement, if any
    pub fn assignment(&self, placement: &str) -> Option<&PlacementAssignment> {
        self.placements.iter().find(|a| a.placement == placement)
    }

    /// Effective session cap, `None` when unlimited
    pub fn effective_session_limit(&self) -> Option<u32> {
        match self.session_limit {
            Some(limit) if limit > 0 => Some(u32::try_from(limit).unwrap_or(u32::MAX)),
            _ => None,
        }
    }

    /// Non-blank string payload field
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Integer payload field; numeric strings are accepted
    pub fn payload_u32(&self, key: &str) -> Option<u32> {
        match self.payload.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean payload field; "1"/"true"/"yes" strings are accepted
    pub fn payload_bool(&self, key: &str) -> bool {
        match self.payload.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes" | "on"),
            _ => false,
        }
    }

    /// List-of-strings payload field; a comma separated string is accepted
    pub fn payload_list(&self, key: &str) -> Vec<String> {
        match self.payload.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}
