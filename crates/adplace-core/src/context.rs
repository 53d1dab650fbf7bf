//! Per-request context the engine decides against

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// ISO-3166 alpha-2 country code, trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CountryCode {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Mobile => "mobile",
        };
        f.write_str(name)
    }
}

/// Special page types a display rule can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    FrontPage,
    Single,
    Page,
    Archive,
    Category,
    Tag,
    Author,
    Search,
    NotFound,
    Attachment,
}

/// Taxonomy membership and page-type flags of the page being rendered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    pub post_id: Option<u64>,
    pub post_type: Option<String>,
    pub categories: BTreeSet<u64>,
    pub tags: BTreeSet<u64>,
    pub page_types: BTreeSet<PageType>,
}

/// Countable streams on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Paragraph,
    Archive,
    Comment,
    ForumReply,
    Activity,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamKind::Paragraph => "paragraph",
            StreamKind::Archive => "archive",
            StreamKind::Comment => "comment",
            StreamKind::ForumReply => "forum_reply",
            StreamKind::Activity => "activity",
        };
        f.write_str(name)
    }
}

/// Everything targeting needs to know about one page render.
///
/// Built once per request and never mutated during the render.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub page: PageContext,
    pub device: DeviceClass,
    pub logged_in: bool,
    pub roles: BTreeSet<String>,
    /// Resolved visitor country, `None` when unknown
    pub country: Option<CountryCode>,
    /// Wall-clock time in the site timezone
    pub now: PrimitiveDateTime,
}

impl RequestContext {
    pub fn new(now: PrimitiveDateTime) -> Self {
        Self {
            page: PageContext::default(),
            device: DeviceClass::default(),
            logged_in: false,
            roles: BTreeSet::new(),
            country: None,
            now,
        }
    }

    pub fn with_page(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = device;
        self
    }

    pub fn with_country(mut self, country: Option<CountryCode>) -> Self {
        self.country = country;
        self
    }

    /// Mark the visitor as logged in with the given roles
    pub fn logged_in_as<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logged_in = true;
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }
}
