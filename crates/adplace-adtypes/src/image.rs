use adplace_core::{Ad, PageAssets, RenderOptions};

use crate::handler::{AdTypeHandler, missing_field};

/// Banner image, optionally linked
pub struct ImageHandler;

impl AdTypeHandler for ImageHandler {
    fn tag(&self) -> &'static str {
        "image"
    }

    fn label(&self) -> &'static str {
        "Image"
    }

    fn render(&self, ad: &Ad, options: &RenderOptions, _assets: &mut PageAssets) -> String {
        let Some(src) = ad.payload_str("image_url") else {
            return missing_field(ad, "image_url");
        };

        let mut img = format!(
            r#"<img src="{}" alt="{}" class="{}""#,
            src,
            ad.payload_str("alt").unwrap_or(""),
            options.class("image")
        );
        if let Some(width) = ad.payload_u32("width") {
            img.push_str(&format!(r#" width="{}""#, width));
        }
        if let Some(height) = ad.payload_u32("height") {
            img.push_str(&format!(r#" height="{}""#, height));
        }
        img.push_str(" />");

        let Some(link) = ad.payload_str("link") else {
            return img;
        };

        let rel = ad.payload_str("rel").unwrap_or("sponsored nofollow");
        let target = if ad.payload_bool("new_tab") {
            r#" target="_blank""#
        } else {
            ""
        };
        format!(r#"<a href="{}" rel="{}"{}>{}</a>"#, link, rel, target, img)
    }
}
