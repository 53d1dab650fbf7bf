use adplace_core::{Ad, PageAssets, RenderOptions};

use crate::handler::{AdTypeHandler, missing_field};

pub struct RichTextHandler;

impl AdTypeHandler for RichTextHandler {
    fn tag(&self) -> &'static str {
        "rich_text"
    }

    fn label(&self) -> &'static str {
        "Rich Text"
    }

    fn render(&self, ad: &Ad, options: &RenderOptions, _assets: &mut PageAssets) -> String {
        match ad.payload_str("content") {
            Some(content) => format!(r#"<div class="{}">{}</div>"#, options.class("text"), content),
            None => missing_field(ad, "content"),
        }
    }
}
