//! Ad type handler trait and registry

use std::collections::BTreeMap;
use std::sync::Arc;

use adplace_core::{Ad, PageAssets, RenderOptions};

/// Rendering strategy for one ad type's payload
pub trait AdTypeHandler: Send + Sync {
    /// Tag stored in `Ad::ad_type`
    fn tag(&self) -> &'static str;

    /// Human readable name
    fn label(&self) -> &'static str;

    /// Render the ad's payload to markup.
    ///
    /// Incomplete payloads render the empty string. The only side effect allowed
    /// is queueing a supporting script in `assets`, keyed by handler.
    fn render(&self, ad: &Ad, options: &RenderOptions, assets: &mut PageAssets) -> String;
}

/// Maps ad type tags to handlers
#[derive(Clone, Default)]
pub struct AdTypeRegistry {
    handlers: BTreeMap<String, Arc<dyn AdTypeHandler>>,
}

impl AdTypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in ad type
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(crate::image::ImageHandler);
        registry.register(crate::rich_text::RichTextHandler);
        registry.register(crate::code::CodeHandler);
        registry.register(crate::adsense::AdsenseHandler);
        registry.register(crate::lead_form::LeadFormHandler);
        registry
    }

    /// Register a handler, replacing any previous handler for the same tag
    pub fn register<H: AdTypeHandler + 'static>(&mut self, handler: H) -> Option<Arc<dyn AdTypeHandler>> {
        self.handlers.insert(handler.tag().to_string(), Arc::new(handler))
    }

    pub fn get(&self, tag: &str) -> Option<&dyn AdTypeHandler> {
        self.handlers.get(tag).map(|h| h.as_ref())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Render through the ad's handler; unknown types render nothing
    pub fn render(&self, ad: &Ad, options: &RenderOptions, assets: &mut PageAssets) -> String {
        match self.get(&ad.ad_type) {
            Some(handler) => handler.render(ad, options, assets),
            None => {
                tracing::warn!(ad = %ad.id, ad_type = %ad.ad_type, "Unknown ad type, rendering nothing");
                String::new()
            }
        }
    }
}

/// Log a missing required payload field and return empty markup
pub(crate) fn missing_field(ad: &Ad, field: &str) -> String {
    tracing::warn!(ad = %ad.id, ad_type = %ad.ad_type, field, "Missing required payload field");
    String::new()
}
