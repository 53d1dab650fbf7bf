//! Built-in placements

use adplace_core::StreamKind;

use crate::placement::{
    COUNTING_SETTINGS, Cardinality, HostCapabilities, HostFeature, Placement, PlacementCategory,
    RenderPoint, SettingKind, SettingSpec,
};

pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";
pub const BEFORE_CONTENT: &str = "before_content";
pub const AFTER_CONTENT: &str = "after_content";
pub const AFTER_PARAGRAPH: &str = "after_paragraph";
pub const ARCHIVE_BETWEEN_POSTS: &str = "archive_between_posts";
pub const BETWEEN_COMMENTS: &str = "between_comments";
pub const FORUM_BETWEEN_REPLIES: &str = "forum_between_replies";
pub const ACTIVITY_BETWEEN_ENTRIES: &str = "activity_between_entries";
pub const WIDGET: &str = "widget";
pub const SHORTCODE: &str = "shortcode";
pub const POPUP: &str = "popup";
pub const STICKY_FOOTER: &str = "sticky_footer";

const POPUP_SETTINGS: &[SettingSpec] = &[SettingSpec {
    key: "delay",
    label: "Delay before showing (seconds)",
    kind: SettingKind::Integer { min: 0, default: 0 },
}];

const STICKY_SETTINGS: &[SettingSpec] = &[SettingSpec {
    key: "closable",
    label: "Show a close button",
    kind: SettingKind::Bool { default: true },
}];

/// Table-driven placement covering every built-in insertion point
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPlacement {
    pub tag: &'static str,
    pub label: &'static str,
    pub category: PlacementCategory,
    pub point: RenderPoint,
    pub cardinality: Cardinality,
    pub stream: Option<StreamKind>,
    pub requires: Option<HostFeature>,
    pub settings: &'static [SettingSpec],
    pub wraps: bool,
}

impl BuiltinPlacement {
    const fn hook(tag: &'static str, label: &'static str, category: PlacementCategory, point: RenderPoint) -> Self {
        Self {
            tag,
            label,
            category,
            point,
            cardinality: Cardinality::All,
            stream: None,
            requires: None,
            settings: &[],
            wraps: true,
        }
    }

    const fn counting(
        tag: &'static str,
        label: &'static str,
        category: PlacementCategory,
        point: RenderPoint,
        stream: StreamKind,
    ) -> Self {
        Self {
            stream: Some(stream),
            settings: COUNTING_SETTINGS,
            ..Self::hook(tag, label, category, point)
        }
    }

    const fn single(self) -> Self {
        Self {
            cardinality: Cardinality::One,
            ..self
        }
    }

    const fn requires(self, feature: HostFeature) -> Self {
        Self {
            requires: Some(feature),
            ..self
        }
    }

    const fn with_settings(self, settings: &'static [SettingSpec]) -> Self {
        Self { settings, ..self }
    }

    const fn unwrapped(self) -> Self {
        Self { wraps: false, ..self }
    }
}

impl Placement for BuiltinPlacement {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn category(&self) -> PlacementCategory {
        self.category
    }

    fn render_point(&self) -> RenderPoint {
        self.point
    }

    fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    fn stream(&self) -> Option<StreamKind> {
        self.stream
    }

    fn settings(&self) -> &'static [SettingSpec] {
        self.settings
    }

    fn wraps_output(&self) -> bool {
        self.wraps
    }

    fn is_available(&self, host: &HostCapabilities) -> bool {
        self.requires.is_none_or(|feature| host.has(feature))
    }
}

/// Every built-in placement, in admin display order
pub const BUILTIN: &[BuiltinPlacement] = &[
    BuiltinPlacement::hook(HEADER, "Header", PlacementCategory::Standard, RenderPoint::Head).unwrapped(),
    BuiltinPlacement::hook(FOOTER, "Footer", PlacementCategory::Standard, RenderPoint::Footer),
    BuiltinPlacement::hook(BEFORE_CONTENT, "Before Content", PlacementCategory::Content, RenderPoint::ContentFilter),
    BuiltinPlacement::hook(AFTER_CONTENT, "After Content", PlacementCategory::Content, RenderPoint::ContentFilter),
    BuiltinPlacement::counting(
        AFTER_PARAGRAPH,
        "After Paragraph",
        PlacementCategory::Content,
        RenderPoint::ContentFilter,
        StreamKind::Paragraph,
    ),
    BuiltinPlacement::counting(
        ARCHIVE_BETWEEN_POSTS,
        "Between Archive Posts",
        PlacementCategory::Archive,
        RenderPoint::ArchiveLoop,
        StreamKind::Archive,
    ),
    BuiltinPlacement::counting(
        BETWEEN_COMMENTS,
        "Between Comments",
        PlacementCategory::Community,
        RenderPoint::CommentLoop,
        StreamKind::Comment,
    )
    .requires(HostFeature::Comments),
    BuiltinPlacement::counting(
        FORUM_BETWEEN_REPLIES,
        "Between Forum Replies",
        PlacementCategory::Community,
        RenderPoint::ForumReplyLoop,
        StreamKind::ForumReply,
    )
    .requires(HostFeature::Forum),
    BuiltinPlacement::counting(
        ACTIVITY_BETWEEN_ENTRIES,
        "Between Activity Entries",
        PlacementCategory::Community,
        RenderPoint::ActivityLoop,
        StreamKind::Activity,
    )
    .requires(HostFeature::Activity),
    BuiltinPlacement::hook(WIDGET, "Widget", PlacementCategory::Manual, RenderPoint::WidgetSlot)
        .single()
        .requires(HostFeature::Widgets),
    BuiltinPlacement::hook(SHORTCODE, "Shortcode", PlacementCategory::Manual, RenderPoint::Shortcode).single(),
    BuiltinPlacement::hook(POPUP, "Popup", PlacementCategory::Overlay, RenderPoint::Footer)
        .single()
        .with_settings(POPUP_SETTINGS),
    BuiltinPlacement::hook(STICKY_FOOTER, "Sticky Footer", PlacementCategory::Overlay, RenderPoint::Footer)
        .single()
        .with_settings(STICKY_SETTINGS),
];
